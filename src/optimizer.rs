//! Suchlogik für die optimale Kartongröße.
//!
//! Dieser Modul durchsucht alle ganzzahligen Kartonmaße innerhalb der
//! Seitenlänge-Grenze und wählt den Karton, der die meisten Einheiten eines
//! Produkts in einem einfachen Raster aufnimmt, unter Berücksichtigung von:
//! - Maximaler Seitenlänge pro Achse
//! - Maximalem Gesamtgewicht
//! - Maximaler Stückzahl pro Karton

use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::{debug, trace};
use utoipa::ToSchema;

use crate::model::{CartonCandidate, CartonSolution, PackingConfiguration, Product};
use crate::types::{Dimensional, Vec3, Weighted};

/// Grenzwerte für die Kartonsuche.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct SearchConstraints {
    /// Maximale Seitenlänge je Achse in Zoll (inklusive)
    pub max_carton_side: u32,
    /// Maximales Gesamtgewicht in Pfund (inklusive)
    pub max_carton_weight: f64,
    /// Maximale Anzahl Einheiten pro Karton (inklusive)
    pub max_units_per_carton: u64,
}

impl SearchConstraints {
    pub const DEFAULT_MAX_CARTON_SIDE: u32 = 25;
    pub const DEFAULT_MAX_CARTON_WEIGHT: f64 = 50.0;
    pub const DEFAULT_MAX_UNITS_PER_CARTON: u64 = 150;

    /// Erstellt einen Builder für benutzerdefinierte Grenzwerte.
    #[cfg(test)]
    pub fn builder() -> SearchConstraintsBuilder {
        SearchConstraintsBuilder::default()
    }
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            max_carton_side: Self::DEFAULT_MAX_CARTON_SIDE,
            max_carton_weight: Self::DEFAULT_MAX_CARTON_WEIGHT,
            max_units_per_carton: Self::DEFAULT_MAX_UNITS_PER_CARTON,
        }
    }
}

/// Builder für SearchConstraints.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct SearchConstraintsBuilder {
    constraints: SearchConstraints,
}

#[cfg(test)]
impl SearchConstraintsBuilder {
    /// Setzt die maximale Seitenlänge.
    pub fn max_carton_side(mut self, side: u32) -> Self {
        self.constraints.max_carton_side = side;
        self
    }

    /// Setzt das maximale Gesamtgewicht.
    pub fn max_carton_weight(mut self, weight: f64) -> Self {
        self.constraints.max_carton_weight = weight;
        self
    }

    /// Setzt die maximale Stückzahl.
    pub fn max_units_per_carton(mut self, units: u64) -> Self {
        self.constraints.max_units_per_carton = units;
        self
    }

    /// Erstellt die finalen Grenzwerte.
    pub fn build(self) -> SearchConstraints {
        self.constraints
    }
}

/// Gründe, warum ein Kartonkandidat verworfen wurde.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    TooHeavy,
    TooManyUnits,
    SingleUnit,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::TooHeavy => "too_heavy",
            RejectReason::TooManyUnits => "too_many_units",
            RejectReason::SingleUnit => "single_unit",
        }
    }
}

/// Zähler über den Suchverlauf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SearchDiagnostics {
    /// Anzahl bewerteter Kandidaten
    pub evaluated: u64,
    /// Anzahl zulässiger Kandidaten
    pub accepted: u64,
    pub rejected_too_heavy: u64,
    pub rejected_too_many_units: u64,
    pub rejected_single_unit: u64,
}

impl SearchDiagnostics {
    fn record_rejection(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::TooHeavy => self.rejected_too_heavy += 1,
            RejectReason::TooManyUnits => self.rejected_too_many_units += 1,
            RejectReason::SingleUnit => self.rejected_single_unit += 1,
        }
    }

    /// Summe aller verworfenen Kandidaten.
    pub fn rejected(&self) -> u64 {
        self.rejected_too_heavy + self.rejected_too_many_units + self.rejected_single_unit
    }
}

/// Ergebnis der Kartonsuche.
///
/// `best == None` bedeutet: kein zulässiger Karton gefunden. Das ist kein
/// Fehler, sondern ein reguläres Ergebnis.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub best: Option<CartonSolution>,
    pub diagnostics: SearchDiagnostics,
}

impl SearchResult {
    /// Gibt an, ob ein zulässiger Karton gefunden wurde.
    pub fn is_feasible(&self) -> bool {
        self.best.is_some()
    }

    /// Stückzahl des besten Kartons, 0 ohne Ergebnis.
    pub fn total_units(&self) -> u64 {
        self.best.map_or(0, |s| s.total_units)
    }

    /// Gewicht des besten Kartons, 0.0 ohne Ergebnis.
    pub fn total_weight(&self) -> f64 {
        self.best.map_or(0.0, |s| s.weight())
    }
}

/// Ereignisse während der Suche, z.B. für Live-Anzeige per SSE.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum SearchEvent {
    /// Die Suche beginnt.
    Started {
        product_dims: Vec3,
        product_weight: f64,
        constraints: SearchConstraints,
    },
    /// Ein Kandidat mit mehr Einheiten wurde gefunden.
    ImprovedBest {
        carton: CartonCandidate,
        total_units: u64,
        total_weight: f64,
        packing: PackingConfiguration,
    },
    /// Suche abgeschlossen.
    Finished {
        evaluated: u64,
        accepted: u64,
        total_units: u64,
    },
}

/// Ganzzahliger Wertebereich einer Kartonachse.
///
/// Reicht von `ceil(product_len)` bis `max_side` (inklusive). Ist das
/// Produkt länger als `max_side`, ist der Bereich leer.
pub fn axis_range(product_len: f64, max_side: u32) -> RangeInclusive<u32> {
    // `as` sättigt, ein zu großes Produkt ergibt start > max_side
    let lower = product_len.ceil() as u32;
    lower.max(1)..=max_side
}

/// Bewertet einen einzelnen Kandidaten.
///
/// Reihenfolge der Prüfungen: Gewicht, Stückzahl, mindestens zwei Einheiten.
fn evaluate_candidate(
    carton: CartonCandidate,
    product: &Product,
    constraints: &SearchConstraints,
) -> Result<CartonSolution, RejectReason> {
    let packing = PackingConfiguration::for_carton(&carton, product);
    let total_units = packing.total_units();
    let total_weight = total_units as f64 * product.weight();

    if total_weight > constraints.max_carton_weight {
        return Err(RejectReason::TooHeavy);
    }
    if total_units > constraints.max_units_per_carton {
        return Err(RejectReason::TooManyUnits);
    }
    if total_units <= 1 {
        return Err(RejectReason::SingleUnit);
    }

    Ok(CartonSolution {
        carton,
        total_units,
        total_weight,
        packing,
    })
}

/// Hauptfunktion der Kartonsuche.
///
/// # Parameter
/// * `product` - Das validierte Produkt
/// * `constraints` - Grenzwerte für Seitenlänge, Gewicht und Stückzahl
///
/// # Rückgabewert
/// `SearchResult` mit dem besten Karton oder ohne Ergebnis
pub fn find_best_carton(product: &Product, constraints: &SearchConstraints) -> SearchResult {
    find_best_carton_with_progress(product, constraints, |_| {})
}

/// Kartonsuche mit Live-Progress Callback.
///
/// Durchläuft alle Kandidaten aufsteigend, Länge außen, dann Breite, dann
/// Höhe. Ein Kandidat ersetzt das bisher beste Ergebnis nur bei echt mehr
/// Einheiten; bei Gleichstand bleibt der zuerst gefundene Karton.
pub fn find_best_carton_with_progress(
    product: &Product,
    constraints: &SearchConstraints,
    mut on_event: impl FnMut(&SearchEvent),
) -> SearchResult {
    on_event(&SearchEvent::Started {
        product_dims: product.dimensions(),
        product_weight: product.weight(),
        constraints: *constraints,
    });

    let mut diagnostics = SearchDiagnostics::default();
    let mut best: Option<CartonSolution> = None;

    let max_side = constraints.max_carton_side;
    for length in axis_range(product.length(), max_side) {
        for width in axis_range(product.width(), max_side) {
            for height in axis_range(product.height(), max_side) {
                let carton = CartonCandidate::new(length, width, height);
                diagnostics.evaluated += 1;

                let solution = match evaluate_candidate(carton, product, constraints) {
                    Ok(solution) => solution,
                    Err(reason) => {
                        trace!(?carton, reason = reason.code(), "candidate rejected");
                        diagnostics.record_rejection(reason);
                        continue;
                    }
                };
                diagnostics.accepted += 1;

                // Nur echte Verbesserung zählt (Gleichstand: erster gewinnt)
                let improves = best.is_none_or(|current| solution.total_units > current.total_units);
                if improves {
                    on_event(&SearchEvent::ImprovedBest {
                        carton: solution.carton,
                        total_units: solution.total_units,
                        total_weight: solution.total_weight,
                        packing: solution.packing,
                    });
                    best = Some(solution);
                }
            }
        }
    }

    let result = SearchResult { best, diagnostics };
    debug!(
        evaluated = diagnostics.evaluated,
        accepted = diagnostics.accepted,
        rejected_too_heavy = diagnostics.rejected_too_heavy,
        rejected_too_many_units = diagnostics.rejected_too_many_units,
        rejected_single_unit = diagnostics.rejected_single_unit,
        rejected = diagnostics.rejected(),
        total_units = result.total_units(),
        "carton search finished"
    );
    on_event(&SearchEvent::Finished {
        evaluated: diagnostics.evaluated,
        accepted: diagnostics.accepted,
        total_units: result.total_units(),
    });
    result
}
