//! Advisor panel task definitions.
//!
//! Five advisors each review one slice of the startup and report its
//! weaknesses. Task order here is the order outputs come back from the
//! backend and is what maps outputs to categories.

use std::collections::BTreeMap;

use crate::models::analysis::Category;

/// Persona of the advisor running a task.
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub name: &'static str,
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

/// One analysis task. `description` may reference input fields as `{field}`.
#[derive(Debug, Clone, Copy)]
pub struct TaskDefinition {
    pub name: &'static str,
    pub category: Category,
    pub agent: AgentProfile,
    pub description: &'static str,
    pub expected_output: &'static str,
}

const EXPECTED_OUTPUT: &str = "A JSON object of the form \
{\"agent_name\": \"<your role>\", \"weaknesses\": [\"...\", \"...\"]} \
listing 3 to 5 specific weaknesses, each one sentence with concrete details \
drawn from the data above. Return ONLY the JSON object.";

static TASKS: [TaskDefinition; 5] = [
    TaskDefinition {
        name: "marketing_analysis_task",
        category: Category::Marketing,
        agent: AgentProfile {
            name: "Marketing Advisor",
            role: "Marketing Advisor",
            goal: "Identify the weaknesses in the startup's go-to-market, acquisition and retention",
            backstory: "A growth marketer who has scaled several B2B and consumer products \
                        and is blunt about channels that do not pay back.",
        },
        description: "Review the startup's marketing and growth.\n\
                      Marketing channels: {marketing_channels}\n\
                      Monthly users: {monthly_users}\n\
                      Customer acquisition cost: {cac}\n\
                      Retention strategy: {retention_strategy}\n\
                      Growth problems: {growth_problems}\n\
                      Product type: {product_type}\n\
                      Identify ONLY the weaknesses.",
        expected_output: EXPECTED_OUTPUT,
    },
    TaskDefinition {
        name: "tech_analysis_task",
        category: Category::Tech,
        agent: AgentProfile {
            name: "Tech Lead",
            role: "Tech Lead",
            goal: "Identify the weaknesses in the product's technology, architecture and data strategy",
            backstory: "A staff engineer who has led platform rewrites and knows which early \
                        shortcuts turn into scaling problems.",
        },
        description: "Review the startup's product and technology.\n\
                      Product type: {product_type}\n\
                      Current features: {current_features}\n\
                      Tech stack: {tech_stack}\n\
                      Data strategy: {data_strategy}\n\
                      AI usage: {ai_usage}\n\
                      Tech challenges: {tech_challenges}\n\
                      Identify ONLY the weaknesses.",
        expected_output: EXPECTED_OUTPUT,
    },
    TaskDefinition {
        name: "org_hr_analysis_task",
        category: Category::OrgHr,
        agent: AgentProfile {
            name: "Org/HR Strategist",
            role: "Org/HR Strategist",
            goal: "Identify the weaknesses in the team structure, hiring plan and organization",
            backstory: "A people-operations lead who has built teams from five to five hundred \
                        and spots missing roles early.",
        },
        description: "Review the startup's team and organization.\n\
                      Team size: {team_size}\n\
                      Founder roles: {founder_roles}\n\
                      Hiring plan for the next 3 months: {hiring_plan}\n\
                      Organizational challenges: {org_challenges}\n\
                      Identify ONLY the weaknesses.",
        expected_output: EXPECTED_OUTPUT,
    },
    TaskDefinition {
        name: "competitive_analysis_task",
        category: Category::Competitive,
        agent: AgentProfile {
            name: "Competitive Analyst",
            role: "Competitive Analyst",
            goal: "Identify the weaknesses in the startup's competitive position and pricing",
            backstory: "A market analyst who has mapped dozens of crowded software categories \
                        and distrusts unproven differentiation.",
        },
        description: "Review the startup's competition and market.\n\
                      Known competitors: {competitors}\n\
                      Unique advantage: {unique_advantage}\n\
                      Pricing model: {pricing_model}\n\
                      Market risks: {market_risks}\n\
                      Product type: {product_type}\n\
                      Identify ONLY the weaknesses.",
        expected_output: EXPECTED_OUTPUT,
    },
    TaskDefinition {
        name: "finance_analysis_task",
        category: Category::Finance,
        agent: AgentProfile {
            name: "Finance Advisor",
            role: "Finance Advisor",
            goal: "Identify the weaknesses in the startup's burn, revenue and runway",
            backstory: "A former venture CFO who has taken startups from seed to Series B \
                        and reads unit economics first.",
        },
        description: "Review the startup's finances and runway.\n\
                      Monthly burn: {monthly_burn}\n\
                      Current revenue: {current_revenue}\n\
                      Funding status: {funding_status}\n\
                      Runway (months): {runway_months}\n\
                      Financial concerns: {financial_concerns}\n\
                      Team size: {team_size}\n\
                      Identify ONLY the weaknesses.",
        expected_output: EXPECTED_OUTPUT,
    },
];

/// The panel's tasks in execution order.
pub fn task_definitions() -> &'static [TaskDefinition] {
    &TASKS
}

/// Substitute `{field}` placeholders with input values. Unknown placeholders
/// are left as-is.
///
/// Only the template is scanned; substituted values are copied verbatim, so
/// braces inside user text are never expanded.
pub fn render(template: &str, inputs: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let placeholder = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|key| !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

        match placeholder.and_then(|key| inputs.get(key).map(|value| (key, value))) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

impl TaskDefinition {
    /// System prompt describing the advisor persona.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {}. {}\nYour goal: {}.",
            self.agent.role, self.agent.backstory, self.agent.goal
        )
    }

    /// User prompt with inputs filled in and the expected output appended.
    pub fn user_prompt(&self, inputs: &BTreeMap<String, String>) -> String {
        format!(
            "{}\n\nExpected output: {}",
            render(self.description, inputs),
            self.expected_output
        )
    }
}
