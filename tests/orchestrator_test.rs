mod helpers;

use std::sync::Arc;

use ella::config::ConversationConfig;
use ella::orchestrator::{ChatResult, ConversationOrchestrator, FailureKind, CLARIFICATION_PROMPT};
use helpers::{orchestrator, sqlite_store, turn, ScriptedModel, ScriptedStore};

const CLEAR_MESSAGE: &str = "Hello assistant, what is the weather";

#[tokio::test]
async fn vague_message_short_circuits_without_side_effects() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("unused"));
    let orch = orchestrator(store.clone(), model.clone());

    let result = orch.handle_message("user", "it").await;

    assert_eq!(
        result,
        ChatResult::Clarify {
            text: CLARIFICATION_PROMPT.to_string()
        }
    );
    assert_eq!(store.put_count(), 0);
    assert_eq!(store.query_count(), 0);
    assert_eq!(model.call_count(), 0);
    assert!(orch.memory_snapshot().await.is_empty());
}

#[tokio::test]
async fn blank_message_is_a_validation_failure() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("unused"));
    let orch = orchestrator(store.clone(), model.clone());

    for message in ["", "   ", "\n\t"] {
        let result = orch.handle_message("user", message).await;
        assert!(matches!(
            result,
            ChatResult::Failure {
                kind: FailureKind::Validation,
                ..
            }
        ));
    }
    assert_eq!(store.put_count(), 0);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn answer_carries_context_seen_before_reply() {
    let store = Arc::new(ScriptedStore::with_recall(vec![turn("user", "What's up?")]));
    let model = Arc::new(ScriptedModel::replying("Hi there!"));
    let orch = orchestrator(store.clone(), model.clone());

    let result = orch.handle_message("user", CLEAR_MESSAGE).await;

    let ChatResult::Answer {
        prior_context,
        response,
    } = result
    else {
        panic!("expected an answer");
    };
    assert_eq!(response, "Hi there!");
    assert_eq!(prior_context.len(), 1);
    assert_eq!(prior_context[0].author, "user");
    assert_eq!(prior_context[0].content, CLEAR_MESSAGE);

    assert_eq!(
        model.last_prompt().unwrap(),
        format!("user: What's up?\n\nUser: {CLEAR_MESSAGE}")
    );

    let memory = orch.memory_snapshot().await;
    assert_eq!(memory.len(), 2);
    assert_eq!(memory[1].author, "assistant");
    assert_eq!(memory[1].content, "Hi there!");

    // both turns persisted, identical to what memory holds
    let puts = store.puts.lock().unwrap().clone();
    assert_eq!(puts, memory);
}

#[tokio::test]
async fn recall_failure_degrades_to_plain_prompt() {
    let store = Arc::new(ScriptedStore {
        fail_query: true,
        ..ScriptedStore::default()
    });
    let model = Arc::new(ScriptedModel::replying("Sunny."));
    let orch = orchestrator(store.clone(), model.clone());

    let result = orch.handle_message("user", CLEAR_MESSAGE).await;

    assert!(matches!(result, ChatResult::Answer { .. }));
    assert_eq!(model.last_prompt().unwrap(), format!("\n\nUser: {CLEAR_MESSAGE}"));
}

#[tokio::test]
async fn store_write_failure_keeps_conversation_going() {
    let store = Arc::new(ScriptedStore {
        fail_put: true,
        ..ScriptedStore::default()
    });
    let model = Arc::new(ScriptedModel::replying("Still here."));
    let orch = orchestrator(store.clone(), model.clone());

    let result = orch.handle_message("user", CLEAR_MESSAGE).await;

    assert!(matches!(result, ChatResult::Answer { .. }));
    assert_eq!(orch.memory_snapshot().await.len(), 2);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn model_failure_keeps_user_turn() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::failing());
    let orch = orchestrator(store.clone(), model.clone());

    let result = orch.handle_message("user", CLEAR_MESSAGE).await;

    let ChatResult::Failure { kind, detail } = result else {
        panic!("expected failure");
    };
    assert_eq!(kind, FailureKind::Model);
    assert!(detail.contains("timed out"));

    let memory = orch.memory_snapshot().await;
    assert_eq!(memory.len(), 1);
    assert_eq!(memory[0].content, CLEAR_MESSAGE);
    assert_eq!(store.put_count(), 1);
}

#[tokio::test]
async fn panic_becomes_internal_failure() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::panicking());
    let orch = orchestrator(store.clone(), model.clone());

    let result = orch.handle_message("user", CLEAR_MESSAGE).await;

    assert_eq!(
        result,
        ChatResult::Failure {
            kind: FailureKind::Internal,
            detail: "internal server error".into()
        }
    );
    // the orchestrator is still usable afterwards
    assert_eq!(orch.memory_snapshot().await.len(), 1);
}

#[tokio::test]
async fn recall_is_limited_to_top_k() {
    let recall: Vec<_> = (0..5).map(|i| turn("user", &format!("old note {i}"))).collect();
    let store = Arc::new(ScriptedStore::with_recall(recall));
    let model = Arc::new(ScriptedModel::replying("ok"));
    let orch = orchestrator(store.clone(), model.clone());

    orch.handle_message("user", CLEAR_MESSAGE).await;

    assert_eq!(
        model.last_prompt().unwrap(),
        format!("user: old note 0\nuser: old note 1\nuser: old note 2\n\nUser: {CLEAR_MESSAGE}")
    );
}

#[tokio::test]
async fn thread_buffer_stays_bounded_across_requests() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("noted"));
    let orch = orchestrator(store.clone(), model.clone());

    for i in 0..6 {
        let result = orch
            .handle_message("user", &format!("please summarize message number {i}"))
            .await;
        assert!(matches!(result, ChatResult::Answer { .. }));
    }

    let memory = orch.memory_snapshot().await;
    assert_eq!(memory.len(), 10);
    assert!(!memory
        .iter()
        .any(|t| t.content == "please summarize message number 0"));
    assert_eq!(memory[0].content, "please summarize message number 1");
    assert_eq!(memory[9].content, "noted");
}

#[tokio::test]
async fn threads_do_not_share_memory() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("ok"));
    let orch = orchestrator(store.clone(), model.clone());

    orch.handle_message_in("alice", "user", "please summarize the quarterly report")
        .await;
    orch.handle_message_in("bob", "user", "explain rust ownership rules")
        .await;

    let alice = orch.memory_snapshot_of("alice").await;
    let bob = orch.memory_snapshot_of("bob").await;
    assert_eq!(alice[0].content, "please summarize the quarterly report");
    assert_eq!(bob[0].content, "explain rust ownership rules");
    assert!(orch.memory_snapshot().await.is_empty());
}

#[tokio::test]
async fn clear_memory_empties_thread() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("ok"));
    let orch = orchestrator(store.clone(), model.clone());

    orch.handle_message("user", CLEAR_MESSAGE).await;
    assert_eq!(orch.thread_count(), 1);
    orch.clear_memory().await;
    assert!(orch.memory_snapshot().await.is_empty());
    assert_eq!(orch.thread_count(), 0);
    orch.clear_memory().await;
    assert!(orch.memory_snapshot().await.is_empty());
}

#[tokio::test]
async fn thread_registry_is_bounded() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("ok"));
    let config = ConversationConfig {
        max_threads: 4,
        ..ConversationConfig::default()
    };
    let orch = ConversationOrchestrator::new(store, model, &config);

    for i in 0..5 {
        let result = orch.handle_message_in(&format!("t{i}"), "user", CLEAR_MESSAGE).await;
        assert!(matches!(result, ChatResult::Answer { .. }));
    }

    assert_eq!(orch.thread_count(), 4);
    assert!(orch.memory_snapshot_of("t0").await.is_empty());
    assert_eq!(orch.memory_snapshot_of("t4").await.len(), 2);
}

#[tokio::test]
async fn concurrent_requests_preserve_bounds() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("ack"));
    let orch = Arc::new(orchestrator(store.clone(), model.clone()));

    let mut handles = Vec::new();
    for i in 0..25 {
        let orch = Arc::clone(&orch);
        handles.push(tokio::spawn(async move {
            orch.handle_message("user", &format!("please summarize message number {i}"))
                .await
        }));
    }
    for handle in handles {
        assert!(matches!(handle.await.unwrap(), ChatResult::Answer { .. }));
    }

    let memory = orch.memory_snapshot().await;
    assert_eq!(memory.len(), 10);
    assert!(memory.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(store.put_count(), 50);
}

#[tokio::test]
async fn custom_capacity_is_honoured() {
    let store = Arc::new(ScriptedStore::default());
    let model = Arc::new(ScriptedModel::replying("ok"));
    let config = ConversationConfig {
        thread_capacity: 3,
        ..ConversationConfig::default()
    };
    let orch = ConversationOrchestrator::new(store, model, &config);

    orch.handle_message("user", "please summarize message number 1").await;
    orch.handle_message("user", "please summarize message number 2").await;

    assert_eq!(orch.memory_snapshot().await.len(), 3);
}

#[tokio::test]
async fn sqlite_store_feeds_recall_into_next_prompt() {
    let store = Arc::new(sqlite_store());
    let model = Arc::new(ScriptedModel::replying("The Loire is the longest."));
    let orch = orchestrator(store.clone(), model.clone());

    orch.handle_message("user", "largest river in France please").await;
    orch.handle_message("user", "largest river in Germany please").await;

    let prompt = model.last_prompt().unwrap();
    assert!(prompt.ends_with("\n\nUser: largest river in Germany please"));
    assert!(prompt.contains("user: largest river in France please"));
}
