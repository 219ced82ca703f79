use serde_json::Value;

use super::{cell, result_of};

/// Headline figure of each computation, in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "effective_annual_rate_pct",
    "annual_rate",
    "effective_annual_rate",
    "monthly_installment",
    "final_cumulative_spread",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        // A loan whose EIR did not converge has no rate to print.
        if let Some(Value::String(status)) = map.get("eir_status") {
            if status == "not_converged" {
                println!("eir_status: {status}");
                return;
            }
        }

        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", cell(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{key}: {}", cell(val));
            return;
        }
    }

    println!("{}", cell(result));
}
