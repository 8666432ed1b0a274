use crate::domain::account::AccountId;
use crate::error::Result;
use std::io::Write;

pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_balances(&mut self, balances: &[(AccountId, u64)]) -> Result<()> {
        self.writer.write_record(["account", "balance"])?;
        for (account, balance) in balances {
            self.writer
                .write_record([account.as_str(), &balance.to_string()])?;
        }
        self.writer.flush().map_err(crate::error::EscrowError::from)?;
        Ok(())
    }
}
