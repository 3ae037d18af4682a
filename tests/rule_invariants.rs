//! Rule Library Invariant Tests
//!
//! End-to-end behaviour of the built-in rules through `Validator`:
//! - Rule names are case and separator insensitive
//! - Failures carry the declared parameters
//! - Cross-field rules read other attributes through the resolver
//! - exists / unique ask the presence verifier the right question
//! - Messages follow inline -> fallback -> default lookup

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde_json::{json, Value};
use wildcheck::rules::{
    AttributeRuleSet, PresenceVerifier, RuleContext, ValidationError, ValidationResult,
};
use wildcheck::observability::{Logger, Severity};
use wildcheck::validator::{Factory, Validator};

// =============================================================================
// Helper Functions
// =============================================================================

/// Error paths log at WARN and ERROR; keep test output clean.
fn quiet_logs() {
    Logger::set_threshold(Severity::Fatal);
}

fn passes(data: Value, pattern: &str, rules: &str) -> bool {
    let set = AttributeRuleSet::new().with(pattern, rules).unwrap();
    Validator::new(data, set).passes().unwrap()
}

fn passes_all(data: Value, rules: Value) -> bool {
    let set = AttributeRuleSet::from_value(&rules).unwrap();
    Validator::new(data, set).passes().unwrap()
}

/// Arguments of one `count` call.
type CountCall = (String, String, Value, Option<String>, Option<String>, Vec<(String, String)>);

/// Verifier returning a fixed answer and recording its questions.
struct ScriptedVerifier {
    answer: u64,
    counts: Mutex<Vec<CountCall>>,
    multi: Mutex<Vec<(String, String, Vec<Value>)>>,
}

impl ScriptedVerifier {
    fn answering(answer: u64) -> Arc<Self> {
        Arc::new(Self {
            answer,
            counts: Mutex::new(Vec::new()),
            multi: Mutex::new(Vec::new()),
        })
    }
}

impl PresenceVerifier for ScriptedVerifier {
    fn count(
        &self,
        collection: &str,
        column: &str,
        value: &Value,
        excluded_id: Option<&str>,
        id_column: Option<&str>,
        extra: &[(String, String)],
    ) -> ValidationResult<u64> {
        self.counts.lock().unwrap().push((
            collection.to_string(),
            column.to_string(),
            value.clone(),
            excluded_id.map(str::to_string),
            id_column.map(str::to_string),
            extra.to_vec(),
        ));
        Ok(self.answer)
    }

    fn multi_count(&self, collection: &str, column: &str, values: &[Value], _: &[(String, String)]) -> ValidationResult<u64> {
        self.multi
            .lock()
            .unwrap()
            .push((collection.to_string(), column.to_string(), values.to_vec()));
        Ok(self.answer)
    }
}

fn run_with_verifier(data: Value, pattern: &str, rules: &str, verifier: &Arc<ScriptedVerifier>) -> bool {
    let set = AttributeRuleSet::new().with(pattern, rules).unwrap();
    Validator::new(data, set)
        .with_presence_verifier(Arc::clone(verifier) as Arc<dyn PresenceVerifier>)
        .passes()
        .unwrap()
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

// =============================================================================
// Failure Shape
// =============================================================================

#[test]
fn test_failed_rules_carry_parameters() {
    let set = AttributeRuleSet::new().with("foo", "Same:baz").unwrap();
    let mut v = Validator::new(json!({"foo": "bar", "baz": "boom"}), set);

    assert!(!v.passes().unwrap());
    assert_eq!(v.failed().to_value(), json!({"foo": {"same": ["baz"]}}));
}

#[test]
fn test_rules_on_absent_attributes_are_skipped() {
    assert!(passes(json!({"foo": "taylor"}), "name", "Confirmed"));
    assert!(passes(json!({}), "name", "sometimes|required"));
}

// =============================================================================
// Presence Family
// =============================================================================

#[test]
fn test_required() {
    assert!(!passes(json!({}), "name", "Required"));
    assert!(!passes(json!({"name": ""}), "name", "Required"));
    assert!(passes(json!({"name": "foo"}), "name", "Required"));
    assert!(passes(json!({"arr": {"foo": {"bar": "baz"}}}), "arr.foo.bar", "Required"));
    assert!(passes(json!({"arr": [{"foo": "baz"}]}), "arr:*:foo", "Required"));
    assert!(!passes(json!({"arr": [{"foo": ""}]}), "arr:*:foo", "Required"));
}

#[test]
fn test_required_without() {
    assert!(passes(json!({"first": "Taylor"}), "last", "required_without:first"));
    assert!(passes(json!({"first": "Taylor", "last": ""}), "last", "required_without:first"));
    assert!(!passes(json!({"first": ""}), "last", "required_without:first"));
    assert!(!passes(json!({}), "last", "required_without:first"));
    assert!(passes(json!({"last": "Otwell"}), "last", "required_without:first"));
}

#[test]
fn test_required_with_all_and_without_all() {
    let rules = "required_with_all:first,middle";
    assert!(passes(json!({"first": "a"}), "last", rules));
    assert!(!passes(json!({"first": "a", "middle": "b"}), "last", rules));

    let rules = "required_without_all:first,middle";
    assert!(passes(json!({"first": "a"}), "last", rules));
    assert!(!passes(json!({}), "last", rules));
}

#[test]
fn test_accepted() {
    for bad in [json!("no"), Value::Null, json!(0), json!(false), json!("false")] {
        assert!(!passes(json!({ "foo": bad }), "foo", "Accepted"));
    }
    assert!(!passes(json!({}), "foo", "Accepted"));
    for good in [json!("yes"), json!("on"), json!("1"), json!(1), json!(true), json!("true")] {
        assert!(passes(json!({ "foo": good }), "foo", "Accepted"));
    }
}

// =============================================================================
// Numbers and Sizes
// =============================================================================

#[test]
fn test_numeric_and_integer_over_wildcards() {
    assert!(passes(json!({"arr": [{"foo": "1.23"}, {"foo": 1.23}]}), "arr:*:foo", "Numeric"));
    assert!(passes(json!({"arr": [{"foo": "-1"}, {"foo": -1}]}), "arr:*:foo", "Numeric"));
    assert!(!passes(json!({"foo": "asdad"}), "foo", "Numeric"));

    assert!(!passes(json!({"arr": [{"foo": "1.23"}, {"foo": 1.23}]}), "arr:*:foo", "Integer"));
    assert!(passes(json!({"arr": [{"foo": "1"}, {"foo": 1}]}), "arr:*:foo", "Integer"));
}

#[test]
fn test_size_family() {
    assert!(!passes(json!({"foo": "asdad"}), "foo", "Size:3"));
    assert!(passes(json!({"foo": "anc"}), "foo", "Size:3"));
    assert!(!passes(json!({"foo": "123"}), "foo", "Numeric|Size:3"));
    assert!(passes(json!({"foo": "3"}), "foo", "Numeric|Size:3"));
    assert!(passes(json!({"foo": [1, 2, 3]}), "foo", "Array|Size:3"));
    assert!(passes(json!({"arr": [{"foo": ["bar"]}, {"foo": ["baz"]}]}), "arr:*:foo", "Array|Size:1"));

    assert!(passes(json!({"arr": [{"foo": "bar"}, {"foo": "baz"}]}), "arr:*:foo", "Between:2,5"));
    assert!(!passes(json!({"foo": "123"}), "foo", "Numeric|Between:50,100"));
    assert!(!passes(json!({"foo": [1, 2, 3]}), "foo", "Array|Between:1,2"));

    assert!(!passes(json!({"foo": "3"}), "foo", "Min:3"));
    assert!(passes(json!({"foo": "5"}), "foo", "Numeric|Min:3"));
    assert!(!passes(json!({"foo": "211"}), "foo", "Numeric|Max:100"));
    assert!(passes(json!({"foo": [1, 2, 3]}), "foo", "Array|Max:4"));
}

#[test]
fn test_in_and_not_in() {
    assert!(!passes(json!({"name": "foo"}), "name", "In:bar,baz"));
    assert!(!passes(json!({"name": 0}), "name", "In:bar,baz"));
    assert!(passes(json!({"name": "foo"}), "name", "In:foo,baz"));
    assert!(passes(json!({"name": "foo"}), "name", "NotIn:bar,baz"));
    assert!(!passes(json!({"name": "foo"}), "name", "NotIn:foo,baz"));
}

// =============================================================================
// Text, Dates
// =============================================================================

#[test]
fn test_text_shapes() {
    assert!(passes(json!({"x": "aslsdlks"}), "x", "Alpha"));
    assert!(!passes(json!({"x": "aslsdlks\n1\n1"}), "x", "Alpha"));
    assert!(!passes(json!({"x": "http://google.com"}), "x", "Alpha"));
    assert!(passes(json!({"x": "asls13dlks"}), "x", "AlphaNum"));
    assert!(passes(json!({"x": "asls1-_3dlks"}), "x", "AlphaDash"));
    assert!(!passes(json!({"x": "http://-g232oogle.com"}), "x", "AlphaDash"));
}

#[test]
fn test_regex_keeps_commas_and_alternation() {
    assert!(passes(json!({"x": "asdasdf"}), "x", "Regex:/^([a-z])+$/i"));
    assert!(!passes(json!({"x": "aasd234fsd1"}), "x", "Regex:/^([a-z])+$/i"));
    assert!(passes(json!({"x": "a,b"}), "x", "Regex:/^a,b$/i"));
    assert!(passes(json!({"x": "b"}), "x", "required|regex:/^(a|b)$/"));
    assert!(!passes(json!({"x": "c"}), "x", "required|regex:/^(a|b)$/"));
}

#[test]
fn test_invalid_regex_is_configuration_error() {
    quiet_logs();
    let set = AttributeRuleSet::new().with("x", "regex:/([a-z/").unwrap();
    let err = Validator::new(json!({"x": "a"}), set).run().unwrap_err();
    assert!(matches!(err, ValidationError::InvalidParameter { .. }));
}

#[test]
fn test_dates() {
    assert!(passes(json!({"x": "2000-01-01"}), "x", "date"));
    assert!(!passes(json!({"x": "Not a date"}), "x", "date"));
    assert!(passes(json!({"x": "2000-01-01"}), "x", "Before:2012-01-01"));
    assert!(passes(json!({"x": "2012-01-01"}), "x", "After:2000-01-01"));

    let data = json!({"start": "2012-01-01", "ends": "2013-01-01"});
    assert!(passes_all(data, json!({"start": "Before:ends", "ends": "After:start"})));

    let data = json!({"start": "2012-01-01", "ends": "2000-01-01"});
    assert!(!passes_all(data, json!({"start": "After:2000-01-01", "ends": "After:start"})));
}

/// Cross-field lookups use the same path syntax as the attribute itself.
#[test]
fn test_cross_field_nested_paths() {
    let data = json!({"trip": {"from": "2020-05-01", "to": "2020-05-09"}, "pw": "x", "again": {"pw": "x"}});
    assert!(passes_all(
        data,
        json!({"trip:to": "after:trip:from", "pw": "same:again.pw"})
    ));
}

// =============================================================================
// Presence Verifier
// =============================================================================

#[test]
fn test_unique_questions() {
    let verifier = ScriptedVerifier::answering(0);
    assert!(run_with_verifier(json!({"email": "foo"}), "email", "Unique:users", &verifier));
    assert_eq!(
        verifier.counts.lock().unwrap()[0],
        ("users".to_string(), "email".to_string(), json!("foo"), None, None, vec![])
    );

    let verifier = ScriptedVerifier::answering(1);
    assert!(!run_with_verifier(json!({"email": "foo"}), "email", "Unique:users,email_addr,1", &verifier));
    assert_eq!(
        verifier.counts.lock().unwrap()[0],
        ("users".to_string(), "email_addr".to_string(), json!("foo"), Some("1".to_string()), Some("id".to_string()), vec![])
    );

    let verifier = ScriptedVerifier::answering(2);
    let rules = "Unique:users,email_addr,NULL,id_col,foo,bar";
    assert!(!run_with_verifier(json!({"email": "foo"}), "email", rules, &verifier));
    assert_eq!(
        verifier.counts.lock().unwrap()[0],
        ("users".to_string(), "email_addr".to_string(), json!("foo"), None, Some("id_col".to_string()), vec![pair("foo", "bar")])
    );
}

#[test]
fn test_exists_questions() {
    let verifier = ScriptedVerifier::answering(1);
    let rules = "Exists:users,email,account_id,1,name,taylor";
    assert!(run_with_verifier(json!({"email": "foo"}), "email", rules, &verifier));
    assert_eq!(
        verifier.counts.lock().unwrap()[0].5,
        vec![pair("account_id", "1"), pair("name", "taylor")]
    );

    let verifier = ScriptedVerifier::answering(0);
    assert!(!run_with_verifier(json!({"email": "foo"}), "email", "Exists:users,email_addr", &verifier));

    let verifier = ScriptedVerifier::answering(0);
    assert!(!run_with_verifier(json!({"email": ["foo"]}), "email", "Exists:users,email_addr", &verifier));
    assert_eq!(
        verifier.multi.lock().unwrap()[0],
        ("users".to_string(), "email_addr".to_string(), vec![json!("foo")])
    );
}

// =============================================================================
// Messages
// =============================================================================

#[test]
fn test_message_lookup() {
    let set = AttributeRuleSet::new().with("name", "Required").unwrap();
    let mut messages = IndexMap::new();
    messages.insert("name.required".to_string(), "require it please!".to_string());
    let mut v = Validator::new(json!({"name": ""}), set.clone()).with_messages(messages);
    v.run().unwrap();
    assert_eq!(v.messages().first("name"), Some("require it please!"));

    let mut names = IndexMap::new();
    names.insert("name".to_string(), "Name".to_string());
    let mut messages = IndexMap::new();
    messages.insert("required".to_string(), ":attribute is required!".to_string());
    let mut v = Validator::new(json!({"name": ""}), set)
        .with_messages(messages)
        .with_attribute_names(names);
    v.run().unwrap();
    assert_eq!(v.messages().first("name"), Some("Name is required!"));
}

#[test]
fn test_custom_replacer_called() {
    let set = AttributeRuleSet::new().with("name", "Required").unwrap();
    let mut messages = IndexMap::new();
    messages.insert("required".to_string(), "foo bar".to_string());
    let mut v = Validator::new(json!({"name": ""}), set).with_messages(messages);
    v.add_replacement("required", |message, _, _, _| message.replace("bar", "taylor"));

    assert!(v.fails().unwrap());
    assert_eq!(v.messages().first("name"), Some("foo taylor"));
}

#[test]
fn test_custom_validators_with_fallback_messages() {
    let mut factory = Factory::new();
    factory.extend("FooBar", |_: &str, _: &Value, _: &[String], _: &RuleContext<'_>| Ok(false));
    factory.add_fallback_message("foo_bar", "foo!");

    let set = AttributeRuleSet::new().with("name", "foo_bar").unwrap();
    let mut v = factory.make(json!({"name": "taylor"}), set);
    assert!(!v.passes().unwrap());
    assert_eq!(v.messages().first("name"), Some("foo!"));
}

#[test]
fn test_custom_implicit_validator() {
    let set = AttributeRuleSet::new().with("implicit_rule", "implicit_rule").unwrap();
    let mut v = Validator::new(json!({}), set);
    v.add_implicit_extension("implicit_rule", |_: &str, _: &Value, _: &[String], _: &RuleContext<'_>| Ok(true));
    assert!(v.passes().unwrap());
}

#[test]
fn test_sometimes_adding_rules() {
    let set = AttributeRuleSet::new().with("x", "Required").unwrap();
    let mut v = Validator::new(json!({"x": "foo"}), set.clone());
    v.sometimes(&["x"], "Confirmed", |data| data["x"] == "foo").unwrap();
    let names: Vec<_> = v.rules().get("x").unwrap().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["required", "confirmed"]);

    let mut v = Validator::new(json!({"x": "foo"}), set.clone());
    v.sometimes(&["x"], "Confirmed", |data| data["x"] == "bar").unwrap();
    assert_eq!(v.rules().get("x").unwrap().len(), 1);

    let mut v = Validator::new(json!({"x": "foo"}), set);
    v.sometimes(&["x"], ["Foo", "Bar:Baz"], |_| true).unwrap();
    let rules: Vec<String> = v.rules().get("x").unwrap().iter().map(|r| r.to_string()).collect();
    assert_eq!(rules, vec!["required", "foo", "bar:Baz"]);
}

#[test]
fn test_incorrect_parameter_count() {
    quiet_logs();
    let set = AttributeRuleSet::new().with("foo", "required_if:foo").unwrap();
    let err = Validator::new(json!({}), set).passes().unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidParameterCount {
            rule: "required_if".into(),
            expected: 2,
            actual: 1
        }
    );
}
