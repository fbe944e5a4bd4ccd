// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/protocol/processor.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the per-connection protocol processor: it owns the
// connection's mining session, dispatches every inbound message to exactly
// one handler and reacts to chain-head and difficulty events. It is the only
// component that sends messages to the miner.
//
// Tree Location:
// - src/protocol/processor.rs (per-connection dispatcher)
// - Depends on: crate::session, crate::pool, crate::events

use crate::core::types::{ConnectionId, RequestId};
use crate::error::{PoolError, Result};
use crate::events::{EventSink, NoopSink};
use crate::pool::{Pool, ShareOutcome};
use crate::protocol::messages::{ClientMessage, EXTRANONCE1_SIZE, ErrorCode, ServerMessage, SubmitRequest};
use crate::protocol::notify::JobNotificationBuilder;
use crate::protocol::submit::SubmitCoordinator;
use crate::session::{AuthorizeRequest, Session, SessionState};
use crate::utils::time::unix_millis;
use log::{debug, info, warn};
use std::sync::Arc;

const LOG_TARGET: &str = "tari::sv1_pool::protocol::processor";

/// Component name attached to trace records
const COMPONENT: &str = "sv1-pool";

/// Outbound side of a miner connection
pub trait Connection {
    fn uid(&self) -> ConnectionId;

    /// Queue a message for the miner. Delivery failures are the transport's concern
    fn send(&mut self, message: ServerMessage);
}

/// Processes all messages on one connection
pub struct ProtocolProcessor<P: Pool + ?Sized, C: Connection> {
    pool: Arc<P>,
    connection: C,
    session: Option<Session>,
    sink: Arc<dyn EventSink>,
}

impl<P: Pool + ?Sized, C: Connection> ProtocolProcessor<P, C> {
    /// Create the processor together with the connection's session
    pub fn new(pool: Arc<P>, connection: C) -> Self {
        let session = pool.create_session(connection.uid());
        Self {
            pool,
            connection,
            session: Some(session),
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// The session; fails once the processor has been terminated
    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(PoolError::MissingSession)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(PoolError::MissingSession)
    }

    pub fn state(&self) -> Result<SessionState> {
        Ok(self.session()?.state())
    }

    pub fn is_terminated(&self) -> bool {
        self.session.is_none()
    }

    /// Handle one inbound message, sending exactly one response
    pub fn dispatch(&mut self, message: ClientMessage) -> Result<()> {
        self.session()?;
        match message {
            ClientMessage::Subscribe { request_id } => self.on_subscribe(request_id),
            ClientMessage::Authorize(request) => self.on_authorize(request),
            ClientMessage::Submit(request) => self.on_submit(request),
            ClientMessage::Unrecognized {
                request_id,
                description,
            } => self.on_unrecognized(request_id, &description),
        }
    }

    fn on_subscribe(&mut self, request_id: RequestId) -> Result<()> {
        let observed = self.session()?.state();
        self.trace("SUBSCRIBE", observed, &format!("mining.subscribe id={}", request_id));

        let session = self.session_mut()?;
        let extranonce2_size = session.extranonce2_size();
        let response = match session.subscribe() {
            Ok(state) => {
                info!(target: LOG_TARGET,
                    "Connection {} subscribed, session {}",
                    self.connection.uid(), state
                );
                ServerMessage::SubscribeResponse {
                    request_id,
                    subscription_ids: None,
                    extranonce1: vec![0; EXTRANONCE1_SIZE],
                    extranonce2_size,
                }
            }
            Err(rejected) => {
                warn!(target: LOG_TARGET, "Connection {}: {}", self.connection.uid(), rejected);
                ServerMessage::error(
                    Some(request_id),
                    ErrorCode::SubscribeNotExpected,
                    format!("Subscribe not expected when in: {}", rejected.state),
                )
            }
        };
        self.connection.send(response);
        Ok(())
    }

    fn on_authorize(&mut self, request: AuthorizeRequest) -> Result<()> {
        let request_id = request.request_id.clone();
        let payload = format!("mining.authorize id={} user={}", request_id, request.username);

        self.session_mut()?.authorize(request);

        let observed = self.session()?.state();
        self.trace("AUTHORIZE", observed, &payload);
        self.connection.send(ServerMessage::OkResult { request_id });
        Ok(())
    }

    fn on_submit(&mut self, request: SubmitRequest) -> Result<()> {
        let session = self.session()?;
        self.trace(
            "SUBMIT",
            session.state(),
            &format!("mining.submit id={} job={}", request.request_id, request.job_id),
        );

        let outcome = SubmitCoordinator::submit(self.pool.as_ref(), &request, session);
        match &outcome {
            ShareOutcome::Accepted => debug!(target: LOG_TARGET,
                "Connection {}: share for job {} accepted",
                self.connection.uid(), request.job_id
            ),
            ShareOutcome::Rejected(reason) => info!(target: LOG_TARGET,
                "Connection {}: share for job {} rejected: {}",
                self.connection.uid(), request.job_id, reason
            ),
        }

        self.connection.send(SubmitCoordinator::response(request.request_id, &outcome));
        Ok(())
    }

    fn on_unrecognized(&mut self, request_id: Option<RequestId>, description: &str) -> Result<()> {
        debug!(target: LOG_TARGET, "Connection {}: unrecognized message {}", self.connection.uid(), description);
        self.connection.send(ServerMessage::error(
            request_id,
            ErrorCode::UnrecognizedMessage,
            format!("Unrecognized message: {}", description),
        ));
        Ok(())
    }

    /// A new chain head invalidates all outstanding work
    pub fn on_new_chain_head(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(PoolError::MissingSession)?;
        let work = JobNotificationBuilder::build(self.pool.as_ref(), session, true);
        self.connection.send(ServerMessage::Notify(work));
        Ok(())
    }

    /// Re-target the session. The new difficulty reaches the miner before
    /// the job generated at that difficulty.
    pub fn on_difficulty_change(&mut self, difficulty: f64) -> Result<()> {
        self.session_mut()?.set_difficulty(difficulty);
        self.connection.send(ServerMessage::SetDifficulty { value: difficulty });

        let session = self.session.as_mut().ok_or(PoolError::MissingSession)?;
        let work = JobNotificationBuilder::build(self.pool.as_ref(), session, false);
        self.connection.send(ServerMessage::Notify(work));
        Ok(())
    }

    /// Tear down the session. Every later call fails with `MissingSession`
    pub fn terminate(&mut self) -> Result<()> {
        let session = self.session.take().ok_or(PoolError::MissingSession)?;
        info!(target: LOG_TARGET,
            "Connection {} terminated after {} authorize request(s)",
            self.connection.uid(),
            session.authorize_log().len()
        );
        session.terminate();
        Ok(())
    }

    fn trace(&self, kind: &str, observed: SessionState, payload: &str) {
        self.sink.record(
            COMPONENT,
            unix_millis(),
            self.connection.uid(),
            &format!("{}: {}", kind, observed),
            payload,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{JobId, PoolConfig, ShareFields};
    use crate::core::types::RequestId::Number;
    use crate::events::MemorySink;
    use crate::pool::{InMemoryJobRegistry, InMemoryPool};

    struct Outbox {
        sent: Vec<ServerMessage>,
    }

    impl Connection for Outbox {
        fn uid(&self) -> ConnectionId {
            42
        }

        fn send(&mut self, message: ServerMessage) {
            self.sent.push(message);
        }
    }

    fn processor(pool: InMemoryPool) -> ProtocolProcessor<InMemoryPool, Outbox> {
        ProtocolProcessor::new(Arc::new(pool), Outbox { sent: Vec::new() })
    }

    fn default_processor() -> ProtocolProcessor<InMemoryPool, Outbox> {
        processor(InMemoryPool::new(PoolConfig {
            extranonce2_size: 4,
            initial_difficulty: 8.0,
        }))
    }

    fn processor_in(state: SessionState) -> ProtocolProcessor<InMemoryPool, Outbox> {
        let mut processor = default_processor();
        let session = processor.session.take().unwrap().with_state(state);
        processor.session = Some(session);
        processor
    }

    fn sent(processor: &ProtocolProcessor<InMemoryPool, Outbox>) -> &[ServerMessage] {
        &processor.connection().sent
    }

    fn submit(request_id: RequestId, job_id: JobId) -> ClientMessage {
        ClientMessage::Submit(SubmitRequest {
            request_id,
            worker: "alice.rig1".to_string(),
            job_id,
            share: ShareFields::default(),
        })
    }

    #[test]
    fn test_subscribe_from_init() {
        let mut processor = default_processor();
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }).unwrap();

        assert_eq!(
            sent(&processor),
            &[ServerMessage::SubscribeResponse {
                request_id: Number(1),
                subscription_ids: None,
                extranonce1: vec![0; 8],
                extranonce2_size: 4,
            }]
        );
        assert_eq!(processor.state().unwrap(), SessionState::Running);
        assert_eq!(processor.session().unwrap().state_machine().activations(), 1);
    }

    #[test]
    fn test_subscribe_announces_session_extranonce2_size() {
        let mut processor = default_processor();
        processor.session = Some(Session::new(42, 8.0, 2, Box::new(InMemoryJobRegistry::new())));
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }).unwrap();
        assert!(matches!(
            sent(&processor)[0],
            ServerMessage::SubscribeResponse {
                extranonce2_size: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_subscribe_from_authorized() {
        let mut processor = processor_in(SessionState::Authorized);
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(3) }).unwrap();
        assert!(matches!(sent(&processor)[0], ServerMessage::SubscribeResponse { request_id: Number(3), .. }));
        assert_eq!(processor.state().unwrap(), SessionState::Running);
    }

    #[test]
    fn test_subscribe_rejected_outside_handshake() {
        for state in [SessionState::Configured, SessionState::Subscribed, SessionState::Running] {
            let mut processor = processor_in(state);
            processor.dispatch(ClientMessage::Subscribe { request_id: Number(2) }).unwrap();

            assert_eq!(
                sent(&processor),
                &[ServerMessage::ErrorResult {
                    request_id: Some(Number(2)),
                    code: -1,
                    message: format!("Subscribe not expected when in: {}", state),
                }]
            );
            assert_eq!(processor.state().unwrap(), state);
        }
    }

    #[test]
    fn test_second_subscribe_rejected() {
        let mut processor = default_processor();
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }).unwrap();
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(2) }).unwrap();
        assert!(matches!(
            sent(&processor)[1],
            ServerMessage::ErrorResult { request_id: Some(Number(2)), code: -1, .. }
        ));
        assert_eq!(processor.state().unwrap(), SessionState::Running);
    }

    #[test]
    fn test_authorize_always_ok_and_logged() {
        let mut processor = default_processor();
        for id in 10..13 {
            processor
                .dispatch(ClientMessage::Authorize(AuthorizeRequest {
                    request_id: Number(id),
                    username: "alice".to_string(),
                    password: String::new(),
                }))
                .unwrap();
        }
        let expected: Vec<_> = (10..13).map(|id| ServerMessage::OkResult { request_id: Number(id) }).collect();
        assert_eq!(sent(&processor), expected.as_slice());
        assert_eq!(processor.session().unwrap().authorize_log().len(), 3);
        assert_eq!(processor.state().unwrap(), SessionState::Init);
    }

    #[test]
    fn test_unrecognized_message_references_offender() {
        let mut processor = default_processor();
        processor
            .dispatch(ClientMessage::Unrecognized {
                request_id: Some(Number(5)),
                description: "mining.configure".to_string(),
            })
            .unwrap();
        match &sent(&processor)[0] {
            ServerMessage::ErrorResult {
                request_id,
                code,
                message,
            } => {
                assert_eq!(*request_id, Some(Number(5)));
                assert_eq!(*code, -2);
                assert!(message.contains("mining.configure"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_new_chain_head_sends_clean_notify() {
        let mut processor = default_processor();
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }).unwrap();
        for _ in 0..3 {
            processor.on_difficulty_change(8.0).unwrap();
        }
        assert_eq!(processor.session().unwrap().job_registry().active_jobs(), 3);

        processor.on_new_chain_head().unwrap();

        match sent(&processor).last() {
            Some(ServerMessage::Notify(work)) => assert!(work.clean_jobs),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(processor.session().unwrap().job_registry().active_jobs(), 1);
        assert!(
            !sent(&processor)[7..]
                .iter()
                .any(|m| matches!(m, ServerMessage::SetDifficulty { .. }))
        );
    }

    #[test]
    fn test_difficulty_change_orders_set_difficulty_first() {
        let mut processor = default_processor();
        processor.on_difficulty_change(1024.0).unwrap();

        let sent = sent(&processor);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], ServerMessage::SetDifficulty { value: 1024.0 });
        match &sent[1] {
            ServerMessage::Notify(work) => {
                assert!(!work.clean_jobs);
                let job = processor.session().unwrap().job_registry().get(&work.job_id).unwrap().clone();
                assert_eq!(job.difficulty, 1024.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_low_difficulty_share_rejected() {
        let pool = InMemoryPool::new(PoolConfig::default()).with_share_check(|_, _| false);
        let mut processor = processor(pool);
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }).unwrap();
        processor.on_new_chain_head().unwrap();
        let job_id = match &sent(&processor)[1] {
            ServerMessage::Notify(work) => work.job_id.clone(),
            other => panic!("unexpected {:?}", other),
        };

        processor.dispatch(submit(Number(4), job_id)).unwrap();

        assert_eq!(
            sent(&processor)[2],
            ServerMessage::ErrorResult {
                request_id: Some(Number(4)),
                code: -3,
                message: "Too low difficulty".to_string(),
            }
        );
        assert_eq!(processor.state().unwrap(), SessionState::Running);
    }

    #[test]
    fn test_valid_share_accepted() {
        let mut processor = default_processor();
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }).unwrap();
        processor.on_new_chain_head().unwrap();
        let job_id = match &sent(&processor)[1] {
            ServerMessage::Notify(work) => work.job_id.clone(),
            other => panic!("unexpected {:?}", other),
        };
        processor.dispatch(submit(Number(5), job_id)).unwrap();
        assert_eq!(sent(&processor)[2], ServerMessage::OkResult { request_id: Number(5) });
    }

    #[test]
    fn test_trace_records_observed_state() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = default_processor().with_sink(sink.clone());
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }).unwrap();
        processor.dispatch(ClientMessage::Subscribe { request_id: Number(2) }).unwrap();
        processor.dispatch(submit(Number(3), JobId::new("0"))).unwrap();

        let labels: Vec<_> = sink.records().into_iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["SUBSCRIBE: INIT", "SUBSCRIBE: RUNNING", "SUBMIT: RUNNING"]);
        assert!(sink.records().iter().all(|r| r.connection_id == 42 && r.component == COMPONENT));
    }

    #[test]
    fn test_terminated_processor_refuses_to_operate() {
        let mut processor = default_processor();
        processor.terminate().unwrap();

        assert!(processor.is_terminated());
        assert!(matches!(
            processor.dispatch(ClientMessage::Subscribe { request_id: Number(1) }),
            Err(PoolError::MissingSession)
        ));
        assert!(matches!(processor.on_new_chain_head(), Err(PoolError::MissingSession)));
        assert!(matches!(processor.on_difficulty_change(2.0), Err(PoolError::MissingSession)));
        assert!(matches!(processor.terminate(), Err(PoolError::MissingSession)));
        assert!(sent(&processor).is_empty());
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Initial per-connection protocol processor.
//   - Purpose: Exhaustive dispatch over ClientMessage with one handler per kind.
//   - Features: Chain-head and difficulty reactions, trace records through an
//     injected EventSink, MissingSession once terminated.
