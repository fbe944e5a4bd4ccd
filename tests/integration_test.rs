// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/integration_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains integration tests for the sv1-pool session core, located
// in the tests directory. It drives full miner conversations through the
// codec and protocol processor against the in-memory pool.
//
// Tree Location:
// - tests/integration_test.rs (integration tests)
// - Depends on: sv1-pool, serde_json

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use std::sync::Arc;
    use sv1_pool::core::types::ConnectionId;
    use sv1_pool::protocol::codec;
    use sv1_pool::{
        Connection, InMemoryPool, MemorySink, PoolConfig, PoolError, ProtocolProcessor, ServerMessage, SessionState,
    };

    /// Connection that keeps every outbound message as a wire value
    #[derive(Default)]
    struct WireRecorder {
        lines: Vec<Value>,
    }

    impl Connection for WireRecorder {
        fn uid(&self) -> ConnectionId {
            11
        }

        fn send(&mut self, message: ServerMessage) {
            let line = codec::encode_line(&message);
            assert!(line.ends_with('\n'));
            self.lines.push(serde_json::from_str(line.trim()).unwrap());
        }
    }

    fn new_processor(pool: InMemoryPool) -> ProtocolProcessor<InMemoryPool, WireRecorder> {
        ProtocolProcessor::new(Arc::new(pool), WireRecorder::default())
    }

    fn feed(processor: &mut ProtocolProcessor<InMemoryPool, WireRecorder>, line: &str) {
        processor.dispatch(codec::decode(line)).unwrap();
    }

    fn last(processor: &ProtocolProcessor<InMemoryPool, WireRecorder>) -> &Value {
        processor.connection().lines.last().unwrap()
    }

    #[test]
    fn test_full_miner_conversation() {
        let pool = InMemoryPool::new(PoolConfig {
            extranonce2_size: 4,
            initial_difficulty: 32.0,
        });
        pool.set_chain_head("ab".repeat(32));
        let mut processor = new_processor(pool);

        feed(&mut processor, r#"{"id":1,"method":"mining.authorize","params":["alice.rig1","x"]}"#);
        assert_eq!(last(&processor), &json!({"id": 1, "result": true, "error": null}));
        assert_eq!(processor.state().unwrap(), SessionState::Init);

        feed(&mut processor, r#"{"id":2,"method":"mining.subscribe","params":["cgminer/4.11"]}"#);
        assert_eq!(
            last(&processor),
            &json!({"id": 2, "result": [null, "0000000000000000", 4], "error": null})
        );
        assert_eq!(processor.state().unwrap(), SessionState::Running);

        processor.on_new_chain_head().unwrap();
        let notify = last(&processor).clone();
        assert_eq!(notify["method"], "mining.notify");
        assert_eq!(notify["params"][1], "ab".repeat(32));
        assert_eq!(notify["params"][8], true);
        let job_id = notify["params"][0].as_str().unwrap().to_string();

        let submit = format!(
            r#"{{"id":3,"method":"mining.submit","params":["alice.rig1","{}","00000001","6500a1b2","deadbeef"]}}"#,
            job_id
        );
        feed(&mut processor, &submit);
        assert_eq!(last(&processor), &json!({"id": 3, "result": true, "error": null}));
    }

    #[test]
    fn test_handshake_error_responses() {
        let mut processor = new_processor(InMemoryPool::new(PoolConfig::default()));

        feed(&mut processor, r#"{"id":1,"method":"mining.subscribe","params":[]}"#);
        feed(&mut processor, r#"{"id":2,"method":"mining.subscribe","params":[]}"#);
        assert_eq!(
            last(&processor),
            &json!({"id": 2, "result": null, "error": [-1, "Subscribe not expected when in: RUNNING", null]})
        );

        feed(&mut processor, r#"{"id":3,"method":"mining.extranonce.subscribe","params":[]}"#);
        let error = &last(&processor)["error"];
        assert_eq!(error[0], -2);
        assert!(error[1].as_str().unwrap().contains("mining.extranonce.subscribe"));
        assert_eq!(last(&processor)["id"], 3);
    }

    #[test]
    fn test_difficulty_change_then_stale_job() {
        let mut processor = new_processor(InMemoryPool::new(PoolConfig::default()));
        feed(&mut processor, r#"{"id":1,"method":"mining.subscribe","params":[]}"#);

        processor.on_difficulty_change(64.0).unwrap();
        let lines = &processor.connection().lines;
        assert_eq!(lines[lines.len() - 2]["method"], "mining.set_difficulty");
        assert_eq!(lines[lines.len() - 2]["params"][0], 64.0);
        assert_eq!(lines[lines.len() - 1]["params"][8], false);
        let old_job = lines[lines.len() - 1]["params"][0].as_str().unwrap().to_string();

        // A new chain head retires the job issued with the difficulty change
        processor.on_new_chain_head().unwrap();
        let submit = format!(
            r#"{{"id":9,"method":"mining.submit","params":["w","{}","00000001","6500a1b2","deadbeef"]}}"#,
            old_job
        );
        feed(&mut processor, &submit);
        assert_eq!(
            last(&processor),
            &json!({"id": 9, "result": null, "error": [21, "Job not found", null]})
        );
    }

    #[test]
    fn test_low_difficulty_share_over_the_wire() {
        let pool = InMemoryPool::new(PoolConfig::default()).with_share_check(|job, share| {
            job.difficulty <= 1.0 || share.nonce == "ffffffff"
        });
        let mut processor = new_processor(pool);
        feed(&mut processor, r#"{"id":1,"method":"mining.subscribe","params":[]}"#);
        processor.on_difficulty_change(1000.0).unwrap();
        let job_id = last(&processor)["params"][0].as_str().unwrap().to_string();

        let submit = format!(
            r#"{{"id":5,"method":"mining.submit","params":["w","{}","00000001","6500a1b2","00000000"]}}"#,
            job_id
        );
        feed(&mut processor, &submit);
        assert_eq!(
            last(&processor),
            &json!({"id": 5, "result": null, "error": [-3, "Too low difficulty", null]})
        );
        assert_eq!(processor.state().unwrap(), SessionState::Running);
    }

    #[test]
    fn test_trace_sink_sees_every_request() {
        let sink = Arc::new(MemorySink::new());
        let mut processor =
            new_processor(InMemoryPool::new(PoolConfig::default())).with_sink(sink.clone());

        feed(&mut processor, r#"{"id":1,"method":"mining.authorize","params":["bob","secret"]}"#);
        feed(&mut processor, r#"{"id":2,"method":"mining.subscribe","params":[]}"#);

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "AUTHORIZE: INIT");
        assert_eq!(records[1].label, "SUBSCRIBE: INIT");
        assert!(records.iter().all(|r| r.connection_id == 11));
        assert!(!records[0].payload.contains("secret"));
    }

    #[test]
    fn test_terminated_session_is_gone() {
        let mut processor = new_processor(InMemoryPool::new(PoolConfig::default()));
        feed(&mut processor, r#"{"id":1,"method":"mining.subscribe","params":[]}"#);
        processor.terminate().unwrap();

        let result = processor.dispatch(codec::decode(r#"{"id":2,"method":"mining.subscribe","params":[]}"#));
        assert!(matches!(result, Err(PoolError::MissingSession)));
        assert!(matches!(processor.state(), Err(PoolError::MissingSession)));
        assert_eq!(processor.connection().lines.len(), 1);
    }
}
