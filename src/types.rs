//! Core types and data structures for intercompany consolidation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Profit-and-loss account types recognised by the consolidation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountType {
    /// Revenue - recorded as a non-negative amount
    Revenue,
    /// Expense - recorded as a non-positive amount
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    /// Revenue normally carries a credit balance, Expense a debit balance.
    pub fn normal_balance(&self) -> EntryType {
        match self {
            AccountType::Revenue => EntryType::Credit,
            AccountType::Expense => EntryType::Debit,
        }
    }

    /// Check an amount against the sign convention (Revenue >= 0, Expense <= 0)
    pub fn sign_allows(&self, amount: &BigDecimal) -> bool {
        let zero = BigDecimal::from(0);
        match self {
            AccountType::Revenue => *amount >= zero,
            AccountType::Expense => *amount <= zero,
        }
    }

    /// Column value used in tabular input and output
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Revenue => "Revenue",
            AccountType::Expense => "Expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ConsolidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Revenue" => Ok(AccountType::Revenue),
            "Expense" => Ok(AccountType::Expense),
            other => Err(ConsolidationError::UnknownAccountType(other.to_string())),
        }
    }
}

/// Sides of a double-entry posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit - increases Expense, decreases Revenue
    Debit,
    /// Credit - increases Revenue, decreases Expense
    Credit,
}

/// One ledger row as reported by a single company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique transaction identifier
    pub id: String,
    /// Company that reported the transaction
    pub company: String,
    /// Other party to the transaction, if recorded
    pub counterparty: Option<String>,
    /// Revenue or Expense
    pub account_type: AccountType,
    /// Signed amount: positive for Revenue, negative for Expense
    pub amount: BigDecimal,
    /// Free text description
    pub description: String,
}

impl TransactionRecord {
    /// Create a new record. A blank counterparty is stored as absent.
    pub fn new(
        id: String,
        company: String,
        counterparty: Option<String>,
        account_type: AccountType,
        amount: BigDecimal,
        description: String,
    ) -> Self {
        Self {
            id,
            company,
            counterparty: counterparty.filter(|c| !c.trim().is_empty()),
            account_type,
            amount,
            description,
        }
    }

    /// Create a revenue record
    pub fn revenue(
        id: &str,
        company: &str,
        counterparty: &str,
        amount: BigDecimal,
        description: &str,
    ) -> Self {
        Self::new(
            id.to_string(),
            company.to_string(),
            Some(counterparty.to_string()),
            AccountType::Revenue,
            amount,
            description.to_string(),
        )
    }

    /// Create an expense record
    pub fn expense(
        id: &str,
        company: &str,
        counterparty: &str,
        amount: BigDecimal,
        description: &str,
    ) -> Self {
        Self::new(
            id.to_string(),
            company.to_string(),
            Some(counterparty.to_string()),
            AccountType::Expense,
            amount,
            description.to_string(),
        )
    }

    /// Whether the amount sign matches the account type convention
    pub fn has_valid_sign(&self) -> bool {
        self.account_type.sign_allows(&self.amount)
    }
}

/// Internal/External tag derived for every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationTag {
    /// Both the reporting company and the counterparty are group members
    Internal,
    /// At least one party is outside the group, or the counterparty is absent
    External,
}

impl ClassificationTag {
    pub fn is_internal(&self) -> bool {
        matches!(self, ClassificationTag::Internal)
    }
}

/// A record together with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedRecord {
    pub record: TransactionRecord,
    pub tag: ClassificationTag,
}

impl TaggedRecord {
    pub fn is_internal(&self) -> bool {
        self.tag.is_internal()
    }
}

/// Unordered pair of two distinct group companies.
///
/// The smaller identifier (byte order) is always stored first, so `(A, B)`
/// and `(B, A)` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "EntityPairFields")]
pub struct EntityPairKey {
    first: String,
    second: String,
}

/// Serialized form of an [`EntityPairKey`], checked on the way back in
#[derive(Debug, Deserialize)]
struct EntityPairFields {
    first: String,
    second: String,
}

impl TryFrom<EntityPairFields> for EntityPairKey {
    type Error = ConsolidationError;

    fn try_from(value: EntityPairFields) -> Result<Self, Self::Error> {
        let key = Self::new(&value.first, &value.second).ok_or_else(|| {
            ConsolidationError::Configuration(format!(
                "Entity pair needs two distinct companies, got '{}' twice",
                value.first
            ))
        })?;
        if key.first != value.first {
            return Err(ConsolidationError::Configuration(format!(
                "Entity pair '{}|{}' is not in canonical order",
                value.first, value.second
            )));
        }
        Ok(key)
    }
}

impl EntityPairKey {
    /// Build a canonical key. Returns `None` when both sides are the same company.
    pub fn new(a: &str, b: &str) -> Option<Self> {
        if a == b {
            return None;
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Some(Self {
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    /// Key for a record's (company, counterparty) pair, if it has two distinct parties
    pub fn for_record(record: &TransactionRecord) -> Option<Self> {
        record
            .counterparty
            .as_deref()
            .and_then(|counterparty| Self::new(&record.company, counterparty))
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

impl fmt::Display for EntityPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.first, self.second)
    }
}

/// Summed internal activity for one entity pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPairAggregate {
    pub key: EntityPairKey,
    /// Sum of Revenue amounts reported by either side
    pub revenue: BigDecimal,
    /// Sum of Expense amounts reported by either side
    pub expense: BigDecimal,
    pub record_count: usize,
    pub record_ids: BTreeSet<String>,
}

impl EntityPairAggregate {
    pub fn new(key: EntityPairKey) -> Self {
        Self {
            key,
            revenue: BigDecimal::from(0),
            expense: BigDecimal::from(0),
            record_count: 0,
            record_ids: BTreeSet::new(),
        }
    }

    /// Add one internal record to the running sums
    pub fn add(&mut self, record: &TransactionRecord) {
        match record.account_type {
            AccountType::Revenue => self.revenue += &record.amount,
            AccountType::Expense => self.expense += &record.amount,
        }
        self.record_count += 1;
        self.record_ids.insert(record.id.clone());
    }

    /// Net internal balance (revenue + expense); zero for a matched pair
    pub fn net(&self) -> BigDecimal {
        &self.revenue + &self.expense
    }
}

/// One entity pair whose internal transactions do not net to zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchReport {
    pub pair: EntityPairKey,
    pub revenue: BigDecimal,
    pub expense: BigDecimal,
    pub net: BigDecimal,
    pub record_ids: Vec<String>,
}

impl MismatchReport {
    pub fn from_aggregate(aggregate: &EntityPairAggregate) -> Self {
        Self {
            pair: aggregate.key.clone(),
            revenue: aggregate.revenue.clone(),
            expense: aggregate.expense.clone(),
            net: aggregate.net(),
            record_ids: aggregate.record_ids.iter().cloned().collect(),
        }
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: revenue = {}, expense = {}, net = {}",
            self.pair, self.revenue, self.expense, self.net
        )
    }
}

/// Group-level totals computed from external activity only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedSummary {
    pub total_revenue: BigDecimal,
    pub total_expense: BigDecimal,
    pub net_profit: BigDecimal,
}

impl ConsolidatedSummary {
    pub fn new(total_revenue: BigDecimal, total_expense: BigDecimal) -> Self {
        let net_profit = &total_revenue + &total_expense;
        Self {
            total_revenue,
            total_expense,
            net_profit,
        }
    }
}

/// Absolute tolerance applied to each pair's net internal balance.
///
/// Amounts are exact decimals, so the default is zero. A ledger exported
/// with rounding noise can be given a small positive allowance instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BigDecimal", into = "BigDecimal")]
pub struct Tolerance(BigDecimal);

impl Tolerance {
    /// Zero tolerance: nets must be exactly zero
    pub fn exact() -> Self {
        Self(BigDecimal::from(0))
    }

    /// Absolute tolerance; negative values are a configuration error
    pub fn absolute(amount: BigDecimal) -> ConsolidationResult<Self> {
        if amount < BigDecimal::from(0) {
            return Err(ConsolidationError::Configuration(format!(
                "Tolerance cannot be negative: {}",
                amount
            )));
        }
        Ok(Self(amount))
    }

    /// Whether a net balance falls within this tolerance
    pub fn admits(&self, net: &BigDecimal) -> bool {
        net.abs() <= self.0
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::exact()
    }
}

impl TryFrom<BigDecimal> for Tolerance {
    type Error = ConsolidationError;

    fn try_from(value: BigDecimal) -> Result<Self, Self::Error> {
        Self::absolute(value)
    }
}

impl From<Tolerance> for BigDecimal {
    fn from(value: Tolerance) -> Self {
        value.0
    }
}

/// Immutable, non-empty set of companies that make up the consolidation group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct GroupMembers(BTreeSet<String>);

impl GroupMembers {
    /// Build a group from company identifiers, matched exactly as given
    pub fn new<I, S>(members: I) -> ConsolidationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for member in members {
            let member = member.into();
            if member.trim().is_empty() {
                return Err(ConsolidationError::Configuration(
                    "Group member identifier cannot be blank".to_string(),
                ));
            }
            set.insert(member);
        }

        if set.is_empty() {
            return Err(ConsolidationError::Configuration(
                "Group membership list is empty".to_string(),
            ));
        }

        Ok(Self(set))
    }

    /// Parse a plain list: one company per line, surrounding whitespace
    /// stripped, blank lines and `#` comments skipped
    pub fn parse(text: &str) -> ConsolidationResult<Self> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn contains(&self, company: &str) -> bool {
        self.0.contains(company)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for GroupMembers {
    type Error = ConsolidationError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupMembers> for Vec<String> {
    fn from(value: GroupMembers) -> Self {
        value.0.into_iter().collect()
    }
}

/// Reasons a single record is rejected before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataQualityIssue {
    /// Amount sign contradicts the account type
    SignConvention {
        account_type: AccountType,
        amount: BigDecimal,
    },
    /// Transaction identifier is blank
    MissingIdentifier,
    /// Reporting company is blank
    MissingCompany,
    /// Transaction identifier was already used by an earlier record
    DuplicateIdentifier,
    /// Internal record whose counterparty is the reporting company itself
    SelfCounterparty,
    /// Identifier contains characters outside the accepted set
    InvalidIdentifier(String),
    /// Description longer than the accepted maximum
    DescriptionTooLong { length: usize, max: usize },
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityIssue::SignConvention {
                account_type,
                amount,
            } => match account_type {
                AccountType::Revenue => {
                    write!(f, "Revenue amount must not be negative, got {}", amount)
                }
                AccountType::Expense => {
                    write!(f, "Expense amount must not be positive, got {}", amount)
                }
            },
            DataQualityIssue::MissingIdentifier => f.write_str("transaction ID is empty"),
            DataQualityIssue::MissingCompany => f.write_str("reporting company is empty"),
            DataQualityIssue::DuplicateIdentifier => f.write_str("transaction ID is not unique"),
            DataQualityIssue::SelfCounterparty => {
                f.write_str("internal transaction names its own company as counterparty")
            }
            DataQualityIssue::InvalidIdentifier(reason) => write!(f, "invalid identifier: {}", reason),
            DataQualityIssue::DescriptionTooLong { length, max } => {
                write!(f, "description is {} characters, maximum is {}", length, max)
            }
        }
    }
}

/// Errors that can occur during a consolidation run
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    #[error("Data quality error in record '{record_id}': {issue}")]
    DataQuality {
        record_id: String,
        issue: DataQualityIssue,
    },
    #[error("Internal transactions do not net to zero for {} entity pair(s)", .0.len())]
    Mismatch(Vec<MismatchReport>),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConsolidationError {
    /// Shorthand for a data quality failure on one record
    pub fn data_quality(record_id: &str, issue: DataQualityIssue) -> Self {
        ConsolidationError::DataQuality {
            record_id: record_id.to_string(),
            issue,
        }
    }

    /// The violating pairs, if this is a mismatch failure
    pub fn mismatches(&self) -> Option<&[MismatchReport]> {
        match self {
            ConsolidationError::Mismatch(reports) => Some(reports),
            _ => None,
        }
    }
}

/// Result type for consolidation operations
pub type ConsolidationResult<T> = Result<T, ConsolidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_sign_convention() {
        assert!(AccountType::Revenue.sign_allows(&BigDecimal::from(100)));
        assert!(AccountType::Revenue.sign_allows(&BigDecimal::from(0)));
        assert!(!AccountType::Revenue.sign_allows(&BigDecimal::from(-1)));
        assert!(AccountType::Expense.sign_allows(&BigDecimal::from(-100)));
        assert!(AccountType::Expense.sign_allows(&BigDecimal::from(0)));
        assert!(!AccountType::Expense.sign_allows(&BigDecimal::from(1)));
    }

    #[test]
    fn test_account_type_parse_is_case_sensitive() {
        assert_eq!("Revenue".parse::<AccountType>().unwrap(), AccountType::Revenue);
        assert_eq!("Expense".parse::<AccountType>().unwrap(), AccountType::Expense);
        assert!(matches!(
            "revenue".parse::<AccountType>(),
            Err(ConsolidationError::UnknownAccountType(_))
        ));
    }

    #[test]
    fn test_blank_counterparty_is_absent() {
        let record = TransactionRecord::new(
            "T1".to_string(),
            "A".to_string(),
            Some("  ".to_string()),
            AccountType::Revenue,
            BigDecimal::from(10),
            String::new(),
        );
        assert_eq!(record.counterparty, None);
    }

    #[test]
    fn test_entity_pair_key_is_unordered() {
        let ab = EntityPairKey::new("A", "B").unwrap();
        let ba = EntityPairKey::new("B", "A").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.first(), "A");
        assert_eq!(ab.second(), "B");
        assert_eq!(ab.to_string(), "A|B");
        assert!(EntityPairKey::new("A", "A").is_none());
    }

    #[test]
    fn test_entity_pair_key_serde_keeps_canonical_order() {
        let key = EntityPairKey::new("B", "A").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"first":"A","second":"B"}"#);
        assert_eq!(serde_json::from_str::<EntityPairKey>(&json).unwrap(), key);

        assert!(serde_json::from_str::<EntityPairKey>(r#"{"first":"B","second":"A"}"#).is_err());
        assert!(serde_json::from_str::<EntityPairKey>(r#"{"first":"A","second":"A"}"#).is_err());
    }

    #[test]
    fn test_tolerance() {
        let exact = Tolerance::exact();
        assert!(exact.admits(&BigDecimal::from(0)));
        assert!(!exact.admits(&"0.001".parse::<BigDecimal>().unwrap()));

        let cent = Tolerance::absolute("0.01".parse().unwrap()).unwrap();
        assert!(cent.admits(&"-0.01".parse::<BigDecimal>().unwrap()));
        assert!(!cent.admits(&"0.011".parse::<BigDecimal>().unwrap()));

        assert!(matches!(
            Tolerance::absolute(BigDecimal::from(-1)),
            Err(ConsolidationError::Configuration(_))
        ));
    }

    #[test]
    fn test_group_members_parse() {
        let group = GroupMembers::parse("  A \n\n# holding\nB\nA\n").unwrap();
        assert_eq!(group.len(), 2);
        assert!(group.contains("A"));
        assert!(group.contains("B"));
        assert!(!group.contains("a"));
    }

    #[test]
    fn test_empty_group_is_configuration_error() {
        assert!(matches!(
            GroupMembers::parse("\n# nothing here\n"),
            Err(ConsolidationError::Configuration(_))
        ));
        assert!(matches!(
            GroupMembers::new(Vec::<String>::new()),
            Err(ConsolidationError::Configuration(_))
        ));
    }

    #[test]
    fn test_group_members_serde_rejects_empty() {
        let group: GroupMembers = serde_json::from_str(r#"["A","B"]"#).unwrap();
        assert_eq!(group.len(), 2);
        assert!(serde_json::from_str::<GroupMembers>("[]").is_err());
    }
}
