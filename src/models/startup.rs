use garde::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq)]
pub enum ProductType {
    Web,
    Mobile,
    SaaS,
    Hardware,
    AI,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq)]
pub enum DataStrategy {
    None,
    #[serde(rename = "User Data")]
    #[strum(serialize = "User Data")]
    UserData,
    #[serde(rename = "External APIs")]
    #[strum(serialize = "External APIs")]
    ExternalApis,
    Proprietary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq)]
pub enum AiUsage {
    None,
    Planned,
    #[serde(rename = "In Production")]
    #[strum(serialize = "In Production")]
    InProduction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq)]
pub enum FundingStatus {
    Bootstrapped,
    Angel,
    Seed,
    #[serde(rename = "Series A")]
    #[strum(serialize = "Series A")]
    SeriesA,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductTechnology {
    #[garde(skip)]
    pub product_type: ProductType,

    #[serde(default)]
    #[garde(length(max = 50), inner(length(max = 200)))]
    pub current_features: Vec<String>,

    #[serde(default)]
    #[garde(length(max = 50), inner(length(max = 200)))]
    pub tech_stack: Vec<String>,

    #[garde(skip)]
    pub data_strategy: DataStrategy,

    #[garde(skip)]
    pub ai_usage: AiUsage,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub tech_challenges: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarketingGrowth {
    #[serde(default)]
    #[garde(length(max = 50), inner(length(max = 200)))]
    pub current_marketing_channels: Vec<String>,

    #[serde(default)]
    #[garde(skip)]
    pub monthly_users: u64,

    #[serde(default)]
    #[garde(length(max = 200))]
    pub customer_acquisition_cost: String,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub retention_strategy: String,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub growth_problems: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TeamOrganization {
    #[serde(default)]
    #[garde(range(max = 1_000_000))]
    pub team_size: u32,

    #[serde(default)]
    #[garde(length(max = 50), inner(length(max = 200)))]
    pub founder_roles: Vec<String>,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub hiring_plan_next_3_months: String,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub org_challenges: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompetitionMarket {
    #[serde(default)]
    #[garde(length(max = 50), inner(length(max = 200)))]
    pub known_competitors: Vec<String>,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub unique_advantage: String,

    #[serde(default)]
    #[garde(length(max = 500))]
    pub pricing_model: String,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub market_risks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FinanceRunway {
    #[serde(default)]
    #[garde(length(max = 200))]
    pub monthly_burn: String,

    #[serde(default)]
    #[garde(length(max = 200))]
    pub current_revenue: String,

    #[garde(skip)]
    pub funding_status: FundingStatus,

    #[serde(default)]
    #[garde(length(max = 100))]
    pub runway_months: String,

    #[serde(default)]
    #[garde(length(max = 2000))]
    pub financial_concerns: String,
}

/// Structured description of a startup submitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartupInput {
    #[garde(dive)]
    pub product_technology: ProductTechnology,
    #[garde(dive)]
    pub marketing_growth: MarketingGrowth,
    #[garde(dive)]
    pub team_organization: TeamOrganization,
    #[garde(dive)]
    pub competition_market: CompetitionMarket,
    #[garde(dive)]
    pub finance_runway: FinanceRunway,
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn text_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Flatten a startup description into the named fields referenced by the
/// task prompt templates.
pub fn prepare_inputs(startup: &StartupInput) -> BTreeMap<String, String> {
    let product = &startup.product_technology;
    let marketing = &startup.marketing_growth;
    let team = &startup.team_organization;
    let competition = &startup.competition_market;
    let finance = &startup.finance_runway;

    let fields = [
        // Marketing
        ("marketing_channels", join_or(&marketing.current_marketing_channels, "None specified")),
        ("monthly_users", marketing.monthly_users.to_string()),
        ("cac", text_or(&marketing.customer_acquisition_cost, "Not tracked")),
        ("retention_strategy", text_or(&marketing.retention_strategy, "No formal strategy")),
        ("growth_problems", text_or(&marketing.growth_problems, "None specified")),
        // Tech
        ("product_type", product.product_type.to_string()),
        ("current_features", join_or(&product.current_features, "None specified")),
        ("tech_stack", join_or(&product.tech_stack, "None specified")),
        ("data_strategy", product.data_strategy.to_string()),
        ("ai_usage", product.ai_usage.to_string()),
        ("tech_challenges", text_or(&product.tech_challenges, "None specified")),
        // Org
        ("team_size", team.team_size.to_string()),
        ("founder_roles", join_or(&team.founder_roles, "None specified")),
        ("hiring_plan", text_or(&team.hiring_plan_next_3_months, "No formal plan")),
        ("org_challenges", text_or(&team.org_challenges, "None specified")),
        // Competition
        ("competitors", join_or(&competition.known_competitors, "None specified")),
        ("unique_advantage", text_or(&competition.unique_advantage, "Not clearly defined")),
        ("pricing_model", text_or(&competition.pricing_model, "Not defined")),
        ("market_risks", text_or(&competition.market_risks, "None identified")),
        // Finance
        ("monthly_burn", text_or(&finance.monthly_burn, "Not tracked")),
        ("current_revenue", text_or(&finance.current_revenue, "$0")),
        ("funding_status", finance.funding_status.to_string()),
        ("runway_months", text_or(&finance.runway_months, "Unknown")),
        ("financial_concerns", text_or(&finance.financial_concerns, "None specified")),
    ];

    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Sample startup used by the CLI when no input file is given.
pub fn sample_startup() -> StartupInput {
    let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    StartupInput {
        product_technology: ProductTechnology {
            product_type: ProductType::SaaS,
            current_features: list(&["User Authentication", "Dashboard Analytics", "API Integration"]),
            tech_stack: list(&["React", "Node.js", "PostgreSQL", "AWS"]),
            data_strategy: DataStrategy::UserData,
            ai_usage: AiUsage::Planned,
            tech_challenges: "Scaling database queries, implementing real-time features".to_string(),
        },
        marketing_growth: MarketingGrowth {
            current_marketing_channels: list(&["Content Marketing", "LinkedIn", "Product Hunt"]),
            monthly_users: 5000,
            customer_acquisition_cost: "$85".to_string(),
            retention_strategy: "Email onboarding sequence, in-app tutorials".to_string(),
            growth_problems: "High churn rate in first 30 days, low organic traffic".to_string(),
        },
        team_organization: TeamOrganization {
            team_size: 8,
            founder_roles: list(&["CEO", "CTO", "CPO"]),
            hiring_plan_next_3_months: "1 Senior Engineer, 1 Marketing Manager, 1 Sales Rep".to_string(),
            org_challenges: "Remote team coordination, lack of clear processes".to_string(),
        },
        competition_market: CompetitionMarket {
            known_competitors: list(&["Competitor A", "Competitor B", "Open Source Solution"]),
            unique_advantage: "AI-powered insights and automation".to_string(),
            pricing_model: "Freemium with $49/month Pro plan".to_string(),
            market_risks: "Large incumbents entering the space, economic downturn".to_string(),
        },
        finance_runway: FinanceRunway {
            monthly_burn: "$75,000".to_string(),
            current_revenue: "$12,000 MRR".to_string(),
            funding_status: FundingStatus::Seed,
            runway_months: "14".to_string(),
            financial_concerns: "Need to improve unit economics before Series A".to_string(),
        },
    }
}
