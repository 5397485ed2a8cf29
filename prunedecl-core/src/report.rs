//! Output formatting - plaintext and JSON.

use serde_json::{json, Value};

use crate::select::CandidateInfo;

/// Prints removal candidates in plain text format.
pub fn print_plain(candidates: &[CandidateInfo]) {
    if candidates.is_empty() {
        println!("No unreferenced declarations found.");
        return;
    }

    println!("UNREFERENCED DECLARATIONS ({}):", candidates.len());
    for c in candidates {
        match c.span {
            Some(span) => println!("{:>4}. {} `{}` [{}]", c.ordinal, c.kind, c.name, span),
            None => println!("{:>4}. {} `{}`", c.ordinal, c.kind, c.name),
        }
    }
}

/// JSON document listing the candidates.
pub fn candidates_to_json(candidates: &[CandidateInfo]) -> Value {
    json!({
        "count": candidates.len(),
        "candidates": candidates,
    })
}

/// Prints removal candidates in JSON format.
///
/// Falls back to a bare count if serialization fails.
pub fn print_json(candidates: &[CandidateInfo]) {
    match serde_json::to_string_pretty(&candidates_to_json(candidates)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{{\"count\": {}}}", candidates.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Span;

    #[test]
    fn test_candidates_to_json() {
        let rows = vec![CandidateInfo {
            ordinal: 1,
            name: "A".to_string(),
            kind: "type alias".to_string(),
            span: Some(Span::new(0, 14)),
            declarations: 1,
        }];
        let value = candidates_to_json(&rows);
        assert_eq!(value["count"], 1);
        assert_eq!(value["candidates"][0]["name"], "A");
        assert_eq!(value["candidates"][0]["span"]["end"], 14);
    }

    #[test]
    fn test_empty_json() {
        let value = candidates_to_json(&[]);
        assert_eq!(value["count"], 0);
        assert!(value["candidates"].as_array().unwrap().is_empty());
    }
}
