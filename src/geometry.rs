//! Geometrische Draufsicht auf eine Kartonpackung.
//!
//! Projiziert die Rasterpackung auf die Ebene aus Länge × Breite. Die Höhe
//! und die Anzahl der Lagen werden dabei ignoriert; die Draufsicht ist eine
//! reine Ableitung aus der `PackingConfiguration`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{CartonSolution, Product};
use crate::types::Dimensional;

/// Grundfläche einer Einheit in der Draufsicht.
///
/// # Felder
/// * `x`, `y` - Position der unteren linken Ecke in Zoll
/// * `length`, `width` - Ausdehnung in Zoll
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct Footprint {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub width: f64,
}

impl Footprint {
    /// Prüft, ob ein Punkt innerhalb der Grundfläche liegt.
    ///
    /// Die Kanten zählen dazu.
    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.length && py >= self.y && py <= self.y + self.width
    }
}

/// Draufsicht: Kartonumriss plus Raster der Einheiten einer Lage.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TopDownLayout {
    /// Kartonlänge in Zoll (X-Achse)
    pub carton_length: f64,
    /// Kartonbreite in Zoll (Y-Achse)
    pub carton_width: f64,
    /// Grundflächen, zeilenweise ab dem Ursprung
    pub units: Vec<Footprint>,
}

impl TopDownLayout {
    /// Erzeugt die Draufsicht aus einem gefundenen Karton.
    ///
    /// Legt `units_length × units_width` Grundflächen der Produktmaße
    /// lückenlos ab dem Ursprung aus.
    pub fn from_solution(solution: &CartonSolution, product: &Product) -> Self {
        let dims = product.dimensions();
        let packing = solution.packing;
        let mut units = Vec::with_capacity(packing.units_per_layer() as usize);

        for i in 0..packing.units_length {
            for j in 0..packing.units_width {
                units.push(Footprint {
                    x: i as f64 * dims.x,
                    y: j as f64 * dims.y,
                    length: dims.x,
                    width: dims.y,
                });
            }
        }

        Self {
            carton_length: f64::from(solution.carton.length),
            carton_width: f64::from(solution.carton.width),
            units,
        }
    }

    /// Anteil der Kartongrundfläche, der von Einheiten belegt ist (0.0 bis 1.0).
    pub fn coverage_ratio(&self) -> f64 {
        let total = self.carton_length * self.carton_width;
        if total <= 0.0 {
            return 0.0;
        }
        let used: f64 = self.units.iter().map(|u| u.length * u.width).sum();
        used / total
    }

    /// Liefert die Grundfläche an einem Punkt, falls vorhanden.
    pub fn unit_at(&self, px: f64, py: f64) -> Option<(usize, &Footprint)> {
        self.units
            .iter()
            .enumerate()
            .find(|(_, unit)| unit.contains_point(px, py))
    }
}
