use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One transaction submitted for signing and execution as a unit: the
/// commands run in order and either all commit or none do.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TransactionSpec {
    pub commands: Vec<Command>,
    pub gas_budget: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    MoveCall { target: String, arguments: Vec<Argument> },
    MergeCoins { primary: String, sources: Vec<String> },
    SplitCoins { coin: String, amounts: Vec<u64> },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Argument {
    /// A shared or owned object passed by id.
    Object { id: String },
    /// An inline value.
    Pure { value: Value },
    /// The output of an earlier command in the same transaction.
    Result { command: u16 },
}

impl Argument {
    pub fn object(id: &str) -> Self {
        Argument::Object { id: id.to_string() }
    }

    pub fn pure_string(value: &str) -> Self {
        Argument::Pure { value: json!(value) }
    }

    // u64 travels as a decimal string, the way the node serializes it
    pub fn pure_u64(value: u64) -> Self {
        Argument::Pure {
            value: json!(value.to_string()),
        }
    }
}

impl TransactionSpec {
    pub fn new() -> Self {
        TransactionSpec {
            commands: vec![],
            gas_budget: 0,
        }
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = budget;
    }

    pub fn move_call(&mut self, target: String, arguments: Vec<Argument>) {
        self.commands.push(Command::MoveCall { target, arguments });
    }

    pub fn merge_coins(&mut self, primary: &str, sources: Vec<String>) {
        self.commands.push(Command::MergeCoins {
            primary: primary.to_string(),
            sources,
        });
    }

    /// Push a split command and hand back an argument addressing its output,
    /// so a later call can spend the exact split amount.
    pub fn split_coins(&mut self, coin: &str, amounts: Vec<u64>) -> Argument {
        self.commands.push(Command::SplitCoins {
            coin: coin.to_string(),
            amounts,
        });
        Argument::Result {
            command: (self.commands.len() - 1) as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_result_addresses_the_split_command() {
        let mut tx = TransactionSpec::new();
        tx.merge_coins("0xc1", vec!["0xc2".to_string(), "0xc3".to_string()]);
        let payment = tx.split_coins("0xc1", vec![1_000_000_000]);
        tx.move_call(
            "0xp::marketplace::buy_and_take".to_string(),
            vec![
                Argument::object("0xmarket"),
                Argument::object("0xnft"),
                payment.clone(),
            ],
        );
        tx.set_gas_budget(100_000_000);

        assert_eq!(payment, Argument::Result { command: 1 });
        assert_eq!(tx.commands.len(), 3);
        assert_eq!(tx.gas_budget, 100_000_000);
    }

    #[test]
    fn spec_serializes_with_tagged_commands() {
        let mut tx = TransactionSpec::new();
        let payment = tx.split_coins("0xc1", vec![42]);
        tx.move_call("0xp::marketplace::list".to_string(), vec![payment]);

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["commands"][0]["command"], "split_coins");
        assert_eq!(value["commands"][0]["amounts"][0], 42);
        assert_eq!(value["commands"][1]["command"], "move_call");
        assert_eq!(value["commands"][1]["arguments"][0]["kind"], "result");
        assert_eq!(value["commands"][1]["arguments"][0]["command"], 0);
    }

    #[test]
    fn pure_u64_travels_as_a_decimal_string() {
        let argument = Argument::pure_u64(1_500_000_000);
        let value = serde_json::to_value(&argument).unwrap();
        assert_eq!(value["value"], "1500000000");
    }
}
