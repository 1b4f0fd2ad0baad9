pub mod encode;
pub mod verdict;
pub mod vocab;

pub use encode::{EncodedSequence, SEQUENCE_LEN, encode, tokenize};
pub use verdict::{SPAM_THRESHOLD, Verdict, is_spam};
pub use vocab::{VocabError, Vocabulary};
