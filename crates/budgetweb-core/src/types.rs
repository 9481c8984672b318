//! Enumerations shared by the finance models

use serde::{Deserialize, Serialize};

/// How often a transaction repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    None,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Default for RecurringFrequency {
    fn default() -> Self {
        RecurringFrequency::None
    }
}

impl std::str::FromStr for RecurringFrequency {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RecurringFrequency::None),
            "daily" => Ok(RecurringFrequency::Daily),
            "weekly" => Ok(RecurringFrequency::Weekly),
            "biweekly" => Ok(RecurringFrequency::Biweekly),
            "monthly" => Ok(RecurringFrequency::Monthly),
            "quarterly" => Ok(RecurringFrequency::Quarterly),
            "annually" => Ok(RecurringFrequency::Annually),
            _ => Err(format!("Invalid recurring frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for RecurringFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecurringFrequency::None => "none",
            RecurringFrequency::Daily => "daily",
            RecurringFrequency::Weekly => "weekly",
            RecurringFrequency::Biweekly => "biweekly",
            RecurringFrequency::Monthly => "monthly",
            RecurringFrequency::Quarterly => "quarterly",
            RecurringFrequency::Annually => "annually",
        };
        write!(f, "{}", name)
    }
}

/// Budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
    Weekly,
    Yearly,
    Custom,
}

impl Default for BudgetPeriod {
    fn default() -> Self {
        BudgetPeriod::Monthly
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "weekly" => Ok(BudgetPeriod::Weekly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            "custom" => Ok(BudgetPeriod::Custom),
            _ => Err(format!("Invalid budget period: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetPeriod::Monthly => write!(f, "monthly"),
            BudgetPeriod::Weekly => write!(f, "weekly"),
            BudgetPeriod::Yearly => write!(f, "yearly"),
            BudgetPeriod::Custom => write!(f, "custom"),
        }
    }
}

/// Goal progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalStatus {
    /// Still saving towards the target
    InProgress,
    Completed,
    Abandoned,
}

impl Default for GoalStatus {
    fn default() -> Self {
        GoalStatus::InProgress
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in-progress" | "in_progress" => Ok(GoalStatus::InProgress),
            "completed" => Ok(GoalStatus::Completed),
            "abandoned" => Ok(GoalStatus::Abandoned),
            _ => Err(format!("Invalid goal status: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalStatus::InProgress => write!(f, "in-progress"),
            GoalStatus::Completed => write!(f, "completed"),
            GoalStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// What a savings goal is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Home,
    Car,
    Education,
    Vacation,
    Retirement,
    Emergency,
    Other,
}

impl Default for GoalCategory {
    fn default() -> Self {
        GoalCategory::Other
    }
}

impl std::str::FromStr for GoalCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" => Ok(GoalCategory::Home),
            "car" => Ok(GoalCategory::Car),
            "education" => Ok(GoalCategory::Education),
            "vacation" => Ok(GoalCategory::Vacation),
            "retirement" => Ok(GoalCategory::Retirement),
            "emergency" => Ok(GoalCategory::Emergency),
            "other" => Ok(GoalCategory::Other),
            _ => Err(format!("Invalid goal category: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GoalCategory::Home => "home",
            GoalCategory::Car => "car",
            GoalCategory::Education => "education",
            GoalCategory::Vacation => "vacation",
            GoalCategory::Retirement => "retirement",
            GoalCategory::Emergency => "emergency",
            GoalCategory::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Kind of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Investment,
    Loan,
    Other,
}

impl Default for AccountType {
    fn default() -> Self {
        AccountType::Checking
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            "credit" => Ok(AccountType::Credit),
            "investment" => Ok(AccountType::Investment),
            "loan" => Ok(AccountType::Loan),
            "other" => Ok(AccountType::Other),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::Credit => "credit",
            AccountType::Investment => "investment",
            AccountType::Loan => "loan",
            AccountType::Other => "other",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_status_serde_is_kebab_case() {
        let json = serde_json::to_string(&GoalStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let parsed: GoalStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, GoalStatus::Completed);
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for period in [
            BudgetPeriod::Monthly,
            BudgetPeriod::Weekly,
            BudgetPeriod::Yearly,
            BudgetPeriod::Custom,
        ] {
            assert_eq!(period.to_string().parse::<BudgetPeriod>(), Ok(period));
        }
        assert_eq!("BIWEEKLY".parse::<RecurringFrequency>(), Ok(RecurringFrequency::Biweekly));
        assert!("fortnightly".parse::<RecurringFrequency>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(RecurringFrequency::default(), RecurringFrequency::None);
        assert_eq!(BudgetPeriod::default(), BudgetPeriod::Monthly);
        assert_eq!(GoalStatus::default(), GoalStatus::InProgress);
        assert_eq!(GoalCategory::default(), GoalCategory::Other);
        assert_eq!(AccountType::default(), AccountType::Checking);
    }
}
