//! Environmental alerts.

use std::collections::BTreeMap;

use shelfwatch_core::ProductName;

use crate::product::{Product, SensorLocation};

/// Active alert messages per product, replaced wholesale on each analytics fetch.
///
/// An empty list means "no active alert", not "alerts cleared".
pub type AlertMap = BTreeMap<ProductName, Vec<String>>;

/// Evaluate a product's sensors against its safe ranges.
///
/// A location is skipped unless both its temperature and humidity are known.
/// Messages are ordered shelf first, temperature before humidity.
/// Temperatures always carry a decimal part (`5.0°C`); humidity is printed
/// as-is (`95%`).
pub fn environment_alerts(product: &Product) -> Vec<String> {
    let mut alerts = Vec::new();

    for location in SensorLocation::ALL {
        let Some(reading) = product.sensor(location) else {
            continue;
        };
        let (Some(temp), Some(humidity)) = (reading.temperature, reading.humidity) else {
            continue;
        };

        if let Some(range) = product.safe_temp {
            if !range.contains(temp) {
                alerts.push(format!("{} temp out of range: {:?}°C", location.label(), temp));
            }
        }
        if let Some(range) = product.safe_humidity {
            if !range.contains(humidity) {
                alerts.push(format!(
                    "{} humidity out of range: {}%",
                    location.label(),
                    humidity
                ));
            }
        }
    }

    alerts
}
