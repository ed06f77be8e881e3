//! Turns a raw CSM payload into an [`Event`].

use thiserror::Error;

use crate::data::Event;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unable to decode an empty payload")]
    EmptyPayload,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Decodes one JSON-encoded CSM message.
pub fn decode(payload: &str) -> Result<Event, DecodeError> {
    if payload.trim().is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    serde_json::from_str(payload).map_err(|err| DecodeError::MalformedPayload(err.to_string()))
}

/// Decodes a datagram as received off the wire.
pub fn decode_bytes(payload: &[u8]) -> Result<Event, DecodeError> {
    let text =
        std::str::from_utf8(payload).map_err(|err| DecodeError::MalformedPayload(err.to_string()))?;
    decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_AGENT: &str = "APN/1.0 HashiCorp/1.0 Terraform/1.1.7 (+https://www.terraform.io) \
        terraform-provider-aws/4.62.0 aws-sdk-go/1.44.237 (go1.19.7; linux; arm64)";

    #[test]
    fn decodes_sdk_payload() {
        let payload = format!(
            r#"{{
                "ClientId": "",
                "Api": "ListRoles",
                "Service": "IAM",
                "Timestamp": 1681236061717,
                "Type": "ApiCall",
                "AttemptCount": 1,
                "Latency": 817,
                "UserAgent": "{}",
                "Region": "eu-central-1",
                "XAmznRequestId": "c14c9ae3-ed1a-3382-75c1-765270f6922a",
                "FinalHttpStatusCode": 200,
                "MaxRetriesExceeded": 0
            }}"#,
            USER_AGENT
        );

        let expected = Event {
            api: "ListRoles".to_owned(),
            service: "IAM".to_owned(),
            event_type: "ApiCall".to_owned(),
            region: "eu-central-1".to_owned(),
            attempts: 1,
            latency: 817,
            request_id: "c14c9ae3-ed1a-3382-75c1-765270f6922a".to_owned(),
            final_http_status_code: 200,
            timestamp: 1_681_236_061_717,
            user_agent: USER_AGENT.to_owned(),
            ..Event::default()
        };

        assert_eq!(decode(&payload), Ok(expected));
    }

    #[test]
    fn decodes_attempt_fields() {
        let payload = r#"{"Type":"ApiCallAttempt","AccessKey":"AKIDEXAMPLE","HttpStatusCode":503,
            "Version":1,"MaxRetriesExceeded":1}"#;
        let event = decode(payload).unwrap();

        assert_eq!(event.event_type, "ApiCallAttempt");
        assert_eq!(event.access_key, "AKIDEXAMPLE");
        assert_eq!(event.http_status_code, 503);
        assert_eq!(event.version, 1);
        assert_eq!(event.max_retries_exceeded, 1);
    }

    #[test]
    fn missing_and_null_fields_are_zero() {
        assert_eq!(decode("{}"), Ok(Event::default()));
        assert_eq!(
            decode(r#"{"Api":null,"Latency":null}"#),
            Ok(Event::default())
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let event = decode(r#"{"ClientId":"my-app","Api":"GetObject","Fqdn":"s3.amazonaws.com"}"#)
            .unwrap();

        assert_eq!(
            event,
            Event {
                api: "GetObject".to_owned(),
                ..Event::default()
            }
        );
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert_eq!(decode(""), Err(DecodeError::EmptyPayload));
        assert_eq!(decode("   "), Err(DecodeError::EmptyPayload));
        assert_eq!(decode_bytes(b"\n\t "), Err(DecodeError::EmptyPayload));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(matches!(
            decode("{not json"),
            Err(DecodeError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode(r#"{"Latency":"fast"}"#),
            Err(DecodeError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode("42"),
            Err(DecodeError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode_bytes(&[b'{', 0xff, 0xfe, b'}']),
            Err(DecodeError::MalformedPayload(_))
        ));
    }
}
