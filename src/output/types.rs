use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "rag-chunker.v1";

#[derive(Debug, Clone, Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

/// One JSON document per command on stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: String,
    pub apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Envelope {
    fn new(op: &str, apply: bool, meta: Option<Meta>) -> Self {
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op: op.to_string(),
            apply,
            plan: None,
            result: None,
            meta,
        }
    }

    pub fn plan<T: Serialize>(op: &str, plan: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        let mut env = Self::new(op, false, meta);
        env.plan = Some(serde_json::to_value(plan)?);
        Ok(env)
    }

    pub fn result<T: Serialize>(op: &str, result: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        let mut env = Self::new(op, true, meta);
        env.result = Some(serde_json::to_value(result)?);
        Ok(env)
    }

    pub fn duration_ms(&self) -> Option<u128> {
        self.meta.as_ref().and_then(|m| m.duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_plan_envelope() {
        let plan = json!({"inputs": 5});
        let env = Envelope::plan("batch", &plan, None).expect("to serialize plan");
        let s = serde_json::to_string(&env).unwrap();
        assert!(s.contains("\"schema_version\":\"rag-chunker.v1\""));
        assert!(s.contains("\"plan\""));
        assert!(s.contains("\"batch\""));
        assert!(s.contains("\"apply\":false"));
        assert!(!s.contains("\"result\""));
        assert!(!s.contains("\"meta\""));
    }

    #[test]
    fn serialize_result_envelope_with_duration() {
        let result = json!({"count": 3});
        let meta = Meta { duration_ms: Some(12), run_id: None };
        let env = Envelope::result("chunk", &result, Some(meta)).expect("to serialize result");
        assert_eq!(env.duration_ms(), Some(12));
        let s = serde_json::to_string(&env).unwrap();
        assert!(s.contains("\"result\":{\"count\":3}"));
        assert!(s.contains("\"apply\":true"));
        assert!(s.contains("\"duration_ms\":12"));
        assert!(!s.contains("run_id"));
    }
}
