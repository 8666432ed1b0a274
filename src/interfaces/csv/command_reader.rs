use crate::error::EscrowError;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Deposit,
    Transfer,
    Create,
    Dispute,
    Escalate,
    Revoke,
    Confirm,
    Settle,
    Feedback,
}

/// One row of an operations script.
///
/// The meaning of `target`, `amount` and `note` depends on the op: `target`
/// is the counterparty for `transfer`, the seller for `create` and the
/// transaction id for lifecycle ops; `amount` carries the rating for
/// `feedback`; `note` is `mediated` to wire the standard mediator on
/// `create`, or the feedback comment.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: OpKind,
    pub actor: String,
    pub target: Option<String>,
    pub amount: Option<u64>,
    pub note: Option<String>,
}

pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command, EscrowError>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EscrowError::from))
    }
}
