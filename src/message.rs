//! Wire types shared by the coordination patterns.

use serde::{Deserialize, Serialize};

/// Stream message wrapper: either one unit of work or an end-of-stream
/// sentinel. Construction enforces that an EOS envelope carries no id and no
/// payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub id: Option<String>,
    pub payload: Option<T>,
    pub eos: bool,
}

impl<T> Envelope<T> {
    pub fn item(id: impl Into<String>, payload: T) -> Self {
        Envelope { id: Some(id.into()), payload: Some(payload), eos: false }
    }

    pub fn end_of_stream() -> Self {
        Envelope { id: None, payload: None, eos: true }
    }
}

/// One classification unit: raw bytes read from storage by the source rank.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkItem {
    pub source_id: String,
    pub bytes: Vec<u8>,
}

/// Output of the classification collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

/// One worker result, consumed exactly once by the sink. `line` is the
/// serialized JSON object appended verbatim to the result log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultRecord {
    pub source_id: String,
    pub line: String,
}

impl ResultRecord {
    /// Builds the log line in the `{"file", "label", "confidence"}` shape.
    pub fn new(source_id: &str, classification: &Classification) -> crate::error::Result<Self> {
        let line = serde_json::to_string(&serde_json::json!({
            "file": source_id,
            "label": classification.label,
            "confidence": classification.confidence,
        }))?;
        Ok(ResultRecord { source_id: source_id.to_string(), line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eos_envelope_carries_nothing() {
        let env: Envelope<WorkItem> = Envelope::end_of_stream();
        assert!(env.eos);
        assert!(env.id.is_none());
        assert!(env.payload.is_none());
    }

    #[test]
    fn item_envelope_round_trips_through_wire_codec() {
        let env = Envelope::item("a.jpg", WorkItem {
            source_id: "a.jpg".into(),
            bytes: vec![1, 2, 3],
        });
        let bytes = bincode::serialize(&env).unwrap();
        let back: Envelope<WorkItem> = bincode::deserialize(&bytes).unwrap();
        assert!(!back.eos);
        assert_eq!(back.id.as_deref(), Some("a.jpg"));
        assert_eq!(back.payload.unwrap().bytes, vec![1, 2, 3]);
    }

    #[test]
    fn result_record_line_is_one_json_object() {
        let rec = ResultRecord::new("img/cat.jpg", &Classification {
            label: "tabby".into(),
            confidence: 0.91,
        })
        .unwrap();
        let v: serde_json::Value = serde_json::from_str(&rec.line).unwrap();
        assert_eq!(v["file"], "img/cat.jpg");
        assert_eq!(v["label"], "tabby");
    }
}
