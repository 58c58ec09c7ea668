use proptest::prelude::*;
use ragchat_engine::conversation::Transcript;
use ragchat_engine::llm::MessageRole;
use ragchat_engine::search::{truncate_chars, SnippetPolicy, ELLIPSIS};

const PLACEHOLDER: &str = "Aucun document pertinent trouvé.";

proptest! {
    // Never more than `top` snippets, never longer than the budget plus the
    // ellipsis, never empty.
    #[test]
    fn test_snippet_limits(
        top in 1usize..6,
        max_chars in 1usize..200,
        docs in prop::collection::vec((".{0,40}", ".{0,400}"), 0..10),
    ) {
        let policy = SnippetPolicy {
            top,
            max_chars,
            placeholder: PLACEHOLDER.to_string(),
        };
        let snippets = policy.build(docs.clone());

        prop_assert!(!snippets.is_empty());
        prop_assert!(snippets.len() <= top);

        if docs.is_empty() {
            prop_assert_eq!(snippets, vec![PLACEHOLDER.to_string()]);
        } else {
            prop_assert_eq!(snippets.len(), docs.len().min(top));
            for snippet in &snippets {
                prop_assert!(snippet.chars().count() <= max_chars + ELLIPSIS.len());
            }
        }
    }

    // Truncation keeps a prefix and only marks text that was actually cut.
    #[test]
    fn test_truncate_keeps_prefix(text in "\\PC{0,300}", max_chars in 0usize..150) {
        let out = truncate_chars(&text, max_chars);

        if text.chars().count() <= max_chars {
            prop_assert_eq!(out, text);
        } else {
            prop_assert!(out.ends_with(ELLIPSIS));
            let kept: String = text.chars().take(max_chars).collect();
            prop_assert_eq!(out, format!("{}{}", kept, ELLIPSIS));
        }
    }

    // After N turns a transcript holds 1 + 2N messages, alternating
    // user/assistant after the system instruction.
    #[test]
    fn test_transcript_shape(
        turns in prop::collection::vec(("[a-z ]{1,20}", "[a-z ]{1,20}"), 1..12),
    ) {
        let (q0, a0) = &turns[0];
        let mut transcript = Transcript::seeded("system", q0.as_str(), a0.as_str());
        for (q, a) in &turns[1..] {
            let request = transcript.request_for(q);
            prop_assert_eq!(request.len(), transcript.len() + 1);
            transcript.push_turn(q.as_str(), a.as_str());
        }

        prop_assert_eq!(transcript.len(), 1 + 2 * turns.len());
        prop_assert_eq!(transcript.turns(), turns.len());

        let messages = transcript.messages();
        prop_assert_eq!(messages[0].role, MessageRole::System);
        for (i, (q, a)) in turns.iter().enumerate() {
            prop_assert_eq!(messages[1 + 2 * i].role, MessageRole::User);
            prop_assert_eq!(&messages[1 + 2 * i].content, q);
            prop_assert_eq!(messages[2 + 2 * i].role, MessageRole::Assistant);
            prop_assert_eq!(&messages[2 + 2 * i].content, a);
        }
    }
}
