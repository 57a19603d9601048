//! Operator-facing text report of a search result.

use std::fmt::Write as _;

use crate::geometry::TopDownLayout;
use crate::model::{CartonSolution, Product};
use crate::optimizer::SearchResult;
use crate::types::{Dimensional, Weighted, units};

pub const NO_CARTON_MESSAGE: &str = "No valid carton configuration found.";

fn format_triple<T: std::fmt::Display>(values: (T, T, T)) -> String {
    format!("({}, {}, {})", values.0, values.1, values.2)
}

fn format_solution(out: &mut String, solution: &CartonSolution, product: &Product) {
    let cm = units::dims_to_cm(solution.carton.dimensions());
    let layout = TopDownLayout::from_solution(solution, product);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Best Master Carton Size (inches):");
    let _ = writeln!(
        out,
        "Carton Dimensions (L x W x H): {}",
        format_triple(solution.carton.as_tuple())
    );
    let _ = writeln!(out, "Units Per Carton: {}", solution.total_units);
    let _ = writeln!(out, "Carton Weight: {:.2} lbs", solution.weight());
    let _ = writeln!(
        out,
        "Packing Configuration (L x W x H): {}",
        format_triple(solution.packing.as_tuple())
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Best Master Carton Size (cm):");
    let _ = writeln!(
        out,
        "Carton Dimensions (L x W x H): ({:.2}, {:.2}, {:.2})",
        cm.x, cm.y, cm.z
    );
    let _ = writeln!(
        out,
        "Carton Weight: {:.2} kg",
        units::pounds_to_kg(solution.weight())
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Volume Utilization: {:.1}%",
        solution.utilization_percent(product)
    );
    let _ = writeln!(
        out,
        "Floor Coverage (top view): {:.1}%",
        layout.coverage_ratio() * 100.0
    );
}

/// Formats the result in inches/pounds and centimeters/kilograms.
///
/// An empty result yields the single "no configuration" line.
pub fn format_report(result: &SearchResult, product: &Product) -> String {
    let mut out = String::new();
    match &result.best {
        Some(solution) => format_solution(&mut out, solution, product),
        None => {
            out.push_str(NO_CARTON_MESSAGE);
            out.push('\n');
        }
    }
    out
}
