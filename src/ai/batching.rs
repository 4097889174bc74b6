//! Attachment Batching
//!
//! The assistants service caps attachments per message, so a prompt with a
//! large evidence set is split across consecutive messages on the same thread.
//! Planning is pure; posting happens in `ConversationThread::post_batched`.

use crate::types::FileId;

/// One outbound message of a batched prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBatch {
    pub text: String,
    pub attachments: Vec<FileId>,
}

/// Split `files` into messages of at most `max_per_message` attachments.
///
/// The first message carries `prompt` and the first chunk. Each later message
/// carries a short batch label. Order is preserved and every file appears
/// exactly once. An empty file list yields a single message with no
/// attachments.
pub fn plan_batches(prompt: &str, files: &[FileId], max_per_message: usize) -> Vec<MessageBatch> {
    let chunk = max_per_message.max(1);

    if files.is_empty() {
        return vec![MessageBatch {
            text: prompt.to_string(),
            attachments: Vec::new(),
        }];
    }

    files
        .chunks(chunk)
        .enumerate()
        .map(|(i, ids)| MessageBatch {
            text: if i == 0 {
                prompt.to_string()
            } else {
                batch_label(i + 1)
            },
            attachments: ids.to_vec(),
        })
        .collect()
}

fn batch_label(batch_number: usize) -> String {
    format!("Additional evidence files (batch {}):", batch_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(n: usize) -> Vec<FileId> {
        (0..n).map(|i| FileId::new(format!("file-{}", i))).collect()
    }

    #[test]
    fn test_empty_evidence_single_message() {
        let batches = plan_batches("PROMPT", &[], 10);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].text, "PROMPT");
        assert!(batches[0].attachments.is_empty());
    }

    #[test]
    fn test_twenty_three_files_split_ten_ten_three() {
        let files = ids(23);
        let batches = plan_batches("PROMPT", &files, 10);

        let sizes: Vec<_> = batches.iter().map(|b| b.attachments.len()).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(batches[0].text, "PROMPT");
        assert_eq!(batches[1].text, "Additional evidence files (batch 2):");
        assert_eq!(batches[2].text, "Additional evidence files (batch 3):");
        assert_eq!(batches[2].attachments[0], FileId::new("file-20"));
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let batches = plan_batches("PROMPT", &ids(20), 10);
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_kept() {
        let files = vec![FileId::new("dup"), FileId::new("dup")];
        let batches = plan_batches("PROMPT", &files, 10);
        assert_eq!(batches[0].attachments.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_batches_partition_files_in_order(n in 0usize..60, cap in 1usize..15) {
            let files = ids(n);
            let batches = plan_batches("P", &files, cap);

            let flattened: Vec<FileId> =
                batches.iter().flat_map(|b| b.attachments.clone()).collect();
            prop_assert_eq!(&flattened, &files);
            prop_assert!(batches.iter().all(|b| b.attachments.len() <= cap));
            prop_assert_eq!(batches.len(), n.div_ceil(cap).max(1));
            prop_assert_eq!(batches[0].text.as_str(), "P");
        }
    }
}
