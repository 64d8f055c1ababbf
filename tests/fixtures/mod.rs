//! Test fixtures: startup payloads and advisor outputs in the shapes models
//! actually produce.

use serde_json::{json, Value};

/// A valid `POST /analyze` body.
pub fn analyze_request() -> Value {
    json!({
        "startup_data": {
            "product_technology": {
                "product_type": "SaaS",
                "current_features": ["User Authentication", "Dashboard Analytics"],
                "tech_stack": ["React", "Node.js", "PostgreSQL"],
                "data_strategy": "User Data",
                "ai_usage": "Planned",
                "tech_challenges": "Scaling database queries"
            },
            "marketing_growth": {
                "current_marketing_channels": ["LinkedIn", "Product Hunt"],
                "monthly_users": 5000,
                "customer_acquisition_cost": "$85",
                "retention_strategy": "Email onboarding",
                "growth_problems": "High churn in first 30 days"
            },
            "team_organization": {
                "team_size": 8,
                "founder_roles": ["CEO", "CTO"],
                "hiring_plan_next_3_months": "1 Senior Engineer",
                "org_challenges": "Remote coordination"
            },
            "competition_market": {
                "known_competitors": ["Competitor A"],
                "unique_advantage": "AI-powered insights",
                "pricing_model": "Freemium",
                "market_risks": "Incumbents entering"
            },
            "finance_runway": {
                "monthly_burn": "$75,000",
                "current_revenue": "$12,000 MRR",
                "funding_status": "Seed",
                "runway_months": "14",
                "financial_concerns": "Unit economics"
            }
        }
    })
}

/// Five advisor outputs, one per category, each in a different shape.
pub fn advisor_outputs() -> Vec<(&'static str, String)> {
    vec![
        (
            "Marketing Advisor",
            r#"{"agent_name": "Marketing Advisor", "weaknesses": ["Churn is high in the first 30 days", "CAC is not tracked per channel"]}"#
                .to_string(),
        ),
        (
            "Tech Lead",
            "Here is my assessment:\n```json\n{\"agent_name\": \"Tech Lead\", \"weaknesses\": [\"Single PostgreSQL instance\"]}\n```"
                .to_string(),
        ),
        (
            "Org/HR Strategist",
            "{'agent_name': 'Org/HR Strategist', 'weaknesses': ['No people operations owner']}".to_string(),
        ),
        (
            "Competitive Analyst",
            "My findings:\n1. Differentiation relies on AI features competitors can copy\n2. Freemium tier gives away the core workflow\n3. Too short".to_string(),
        ),
        (
            "Finance Advisor",
            r#"{"result": {"weaknesses": ["Burn is six times revenue"]}}"#.to_string(),
        ),
    ]
}
