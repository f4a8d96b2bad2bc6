//! Tests for control transfer between the generalist and specialists.

mod common;

use common::{BALANCE, PRODUCTS, escalate, last_user, observation, switch, team};
use sbcore::{
    Error,
    model::{Script, Step},
};
use switchboard_runtime::{ESCALATE, SWITCH_DOMAIN, Turn};

/// Script the shirt request: general switches, shopping searches and
/// replies, general relays.
fn shirt_turn(script: Script) -> Script {
    script
        .call(SWITCH_DOMAIN, switch("shopping", "user wants to buy a shirt"))
        .call("product_search", r#"{"input":"shirt"}"#)
        .reply("We have a T-shirt for $20 and a dress shirt for $50.")
        .reply("We have a T-shirt for $20 and a dress shirt for $50.")
}

#[tokio::test]
async fn shirt_request_switches_to_shopping() {
    let script = shirt_turn(Script::new());
    let mut dispatcher = team(&script);
    assert_eq!(dispatcher.active(), "general");

    let reply = dispatcher.handle("I want to buy a shirt").await;
    assert!(reply.contains("shirt"));
    assert_eq!(dispatcher.active(), "shopping");

    // shopping saw the summary, not the raw utterance, and the search result
    assert_eq!(last_user(&script, 1), "user wants to buy a shirt");
    assert_eq!(observation(&script, 2), PRODUCTS);

    let shopping = dispatcher.agent("shopping").unwrap();
    assert_eq!(
        shopping.history(),
        [Turn {
            user: "user wants to buy a shirt".into(),
            reply: reply.clone()
        }]
    );
    assert_eq!(dispatcher.generalist().history()[0].user, "I want to buy a shirt");
    assert!(dispatcher.agent("banking").unwrap().history().is_empty());
}

#[tokio::test]
async fn next_turn_goes_to_the_new_active_agent() {
    let script = shirt_turn(Script::new()).reply("The dress shirt comes in blue.");
    let mut dispatcher = team(&script);
    dispatcher.handle("I want to buy a shirt").await;

    let reply = dispatcher.handle("what colors?").await;
    assert_eq!(reply, "The dress shirt comes in blue.");
    assert_eq!(script.requests()[4].system_prompt(), Some("You help with shopping."));
    assert_eq!(dispatcher.agent("shopping").unwrap().history().len(), 2);
    assert_eq!(dispatcher.generalist().history().len(), 1);
}

#[tokio::test]
async fn balance_request_escalates_then_switches_to_banking() {
    let balance = "Your balance is 2,000 USD with a 10,000 USD limit.";
    let script = shirt_turn(Script::new())
        .call(
            ESCALATE,
            escalate("user is asking about account balance, outside shopping domain"),
        )
        .call(SWITCH_DOMAIN, switch("banking", "user wants their account balance"))
        .call("card_balance", r#"{"card":"credit"}"#)
        .reply(balance)
        .reply(balance)
        .reply(balance);
    let mut dispatcher = team(&script);
    dispatcher.handle("I want to buy a shirt").await;
    assert_eq!(dispatcher.active(), "shopping");

    let reply = dispatcher.handle("what's my account balance").await;
    assert!(reply.contains("2,000 USD"));
    assert_eq!(dispatcher.active(), "banking");
    assert_eq!(observation(&script, 7), BALANCE);

    assert_eq!(dispatcher.agent("banking").unwrap().history().len(), 1);
    assert_eq!(dispatcher.agent("shopping").unwrap().history().len(), 2);
    let general = dispatcher.generalist().history();
    assert_eq!(general.len(), 2);
    assert_eq!(
        general[1].user,
        "user is asking about account balance, outside shopping domain"
    );
}

#[tokio::test]
async fn switch_then_escalate_returns_control() {
    let script = shirt_turn(Script::new())
        .call(ESCALATE, escalate("user wants to talk about something else"))
        .reply("Sure, what else can I help with?")
        .reply("Sure, what else can I help with?");
    let mut dispatcher = team(&script);

    let before = dispatcher.active().to_owned();
    dispatcher.handle("I want to buy a shirt").await;
    dispatcher.handle("actually, never mind").await;
    assert_eq!(dispatcher.active(), before);
}

#[tokio::test]
async fn unknown_domain_is_fed_back() {
    let script = Script::new()
        .call(SWITCH_DOMAIN, switch("travel", "user wants a flight"))
        .reply("I can't book travel.")
        .reply("Hello!");
    let mut dispatcher = team(&script);

    assert_eq!(dispatcher.handle("book me a flight").await, "I can't book travel.");
    assert_eq!(
        observation(&script, 1),
        "error: `travel` is not a registered domain"
    );
    assert_eq!(dispatcher.active(), "general");

    assert_eq!(dispatcher.handle("hi").await, "Hello!");
}

#[tokio::test]
async fn generalist_is_not_a_domain() {
    let script = Script::new()
        .call(SWITCH_DOMAIN, switch("general", "loop back"))
        .reply("ok");
    let mut dispatcher = team(&script);

    dispatcher.handle("hi").await;
    assert!(observation(&script, 1).contains("`general` is not a registered domain"));
    assert_eq!(dispatcher.active(), "general");
}

#[tokio::test]
async fn empty_summary_is_rejected() {
    let script = Script::new()
        .call(SWITCH_DOMAIN, switch("shopping", "   "))
        .reply("Could you say more?");
    let mut dispatcher = team(&script);

    dispatcher.handle("shirt").await;
    assert!(observation(&script, 1).contains("summary must not be empty"));
    assert_eq!(dispatcher.active(), "general");
    assert_eq!(script.calls_made(), 2);
}

#[tokio::test]
async fn escalating_within_the_switched_turn_returns_control() {
    let script = Script::new()
        .call(SWITCH_DOMAIN, switch("shopping", "user wants a loan"))
        .call(ESCALATE, escalate("loans are not shopping"))
        .reply("We don't offer loans online.")
        .reply("Shopping can't help with loans.")
        .reply("We don't offer loans online, please visit a branch.");
    let mut dispatcher = team(&script);

    let reply = dispatcher.handle("I need a loan").await;
    assert_eq!(reply, "We don't offer loans online, please visit a branch.");
    assert_eq!(dispatcher.active(), "general");
    assert_eq!(script.calls_made(), 5);

    // the nested generalist saw the escalation summary
    assert_eq!(last_user(&script, 2), "loans are not shopping");
    assert_eq!(observation(&script, 3), "We don't offer loans online.");
    assert_eq!(observation(&script, 4), "Shopping can't help with loans.");

    let general = dispatcher.generalist().history();
    assert_eq!(general.len(), 2);
    assert_eq!(general[0].user, "loans are not shopping");
    assert_eq!(general[1].user, "I need a loan");
    assert_eq!(dispatcher.agent("shopping").unwrap().history().len(), 1);
}

#[tokio::test]
async fn transfers_beyond_the_depth_limit_are_refused() {
    let script = Script::new()
        .call(SWITCH_DOMAIN, switch("shopping", "user wants a loan"))
        .call(ESCALATE, escalate("loans are not shopping"))
        .call(SWITCH_DOMAIN, switch("banking", "user wants a loan"))
        .reply("Please visit a branch.")
        .reply("Shopping can't help with loans.")
        .reply("Please visit a branch for loans.");
    let mut dispatcher = team(&script);

    dispatcher.handle("I need a loan").await;
    assert!(observation(&script, 3).contains("transfer depth limit of 2 reached"));
    assert_eq!(dispatcher.active(), "general");
    assert!(dispatcher.agent("banking").unwrap().history().is_empty());
    assert_eq!(script.calls_made(), 6);
}

#[tokio::test]
async fn failed_nested_turn_commits_nothing() {
    let script = Script::new()
        .call(SWITCH_DOMAIN, switch("shopping", "user wants a shirt"))
        .step(Step::Fail("rate limited".into()));
    let mut dispatcher = team(&script);

    let err = dispatcher.turn("buy a shirt").await.unwrap_err();
    assert!(matches!(err, Error::CompletionUnavailable(_)));
    assert_eq!(dispatcher.active(), "general");
    assert!(dispatcher.agents().all(|a| a.history().is_empty()));
}

#[tokio::test]
async fn active_agent_is_always_registered() {
    let script = shirt_turn(Script::new())
        .call(ESCALATE, escalate("off topic"))
        .call(SWITCH_DOMAIN, switch("travel", "flight"))
        .call(SWITCH_DOMAIN, switch("banking", "balance"))
        .reply("2,000 USD")
        .reply("2,000 USD")
        .reply("2,000 USD")
        .step(Step::Fail("down".into()));
    let mut dispatcher = team(&script);

    for line in ["shirt", "balance and a flight", "anything"] {
        dispatcher.handle(line).await;
        assert!(dispatcher.agent(dispatcher.active()).is_some());
    }
    assert_eq!(dispatcher.active(), "banking");
}
