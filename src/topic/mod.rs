//! Topic namespacing and validation
//!
//! A remote-qualified topic is the logical topic prefixed with the remote's
//! name: `/{remote}/{topic}`. Remote names must not contain a level
//! separator, which keeps the mapping injective for distinct
//! (remote, topic) pairs - remotes never collide on the shared transport
//! namespace.

/// Build the remote-qualified form of a logical topic.
pub fn qualify(remote: &str, topic: &str) -> String {
    format!("/{}/{}", remote, topic)
}

/// Validate a remote name.
///
/// Remote names:
/// - Must be at least 1 character
/// - Must not contain a level separator (/)
/// - Must not contain null character
pub fn validate_remote_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("remote name cannot be empty");
    }
    if name.contains('/') {
        return Err("remote name cannot contain a level separator");
    }
    if name.contains('\0') {
        return Err("remote name cannot contain null character");
    }
    Ok(())
}

/// Validate a logical topic name.
///
/// Logical topics:
/// - Must be at least 1 character
/// - Must not contain null character
/// - Must not start with a level separator (the qualified form adds it)
pub fn validate_logical_topic(topic: &str) -> Result<(), &'static str> {
    if topic.is_empty() {
        return Err("topic cannot be empty");
    }
    if topic.contains('\0') {
        return Err("topic cannot contain null character");
    }
    if topic.starts_with('/') {
        return Err("topic cannot start with a level separator");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_qualify_format() {
        assert_eq!(qualify("robot", "project11/command"), "/robot/project11/command");
        assert_eq!(qualify("shore", "project11/response"), "/shore/project11/response");
    }

    #[test]
    fn test_qualify_injective() {
        assert_ne!(qualify("a", "x"), qualify("b", "x"));
        assert_ne!(qualify("a", "x"), qualify("a", "y"));
        // A slash-free remote name cannot shift levels into the topic part
        assert_ne!(qualify("a", "b/c"), qualify("b", "c"));
    }

    #[test_case("robot" => true; "plain name")]
    #[test_case("robot-02" => true; "dash and digits")]
    #[test_case("" => false; "empty")]
    #[test_case("a/b" => false; "level separator")]
    #[test_case("a\0b" => false; "null character")]
    fn test_validate_remote_name(name: &str) -> bool {
        validate_remote_name(name).is_ok()
    }

    #[test_case("project11/command" => true; "nested topic")]
    #[test_case("response" => true; "single level")]
    #[test_case("" => false; "empty")]
    #[test_case("/project11/command" => false; "leading separator")]
    #[test_case("a\0b" => false; "null character")]
    fn test_validate_logical_topic(topic: &str) -> bool {
        validate_logical_topic(topic).is_ok()
    }

    proptest! {
        #[test]
        fn qualify_injective_for_distinct_pairs(
            r1 in "[a-z][a-z0-9_-]{0,8}",
            t1 in "[a-z][a-z0-9_/]{0,16}",
            r2 in "[a-z][a-z0-9_-]{0,8}",
            t2 in "[a-z][a-z0-9_/]{0,16}",
        ) {
            prop_assume!((r1.as_str(), t1.as_str()) != (r2.as_str(), t2.as_str()));
            prop_assert_ne!(qualify(&r1, &t1), qualify(&r2, &t2));
        }
    }
}
