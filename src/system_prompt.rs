//! Fixed instruction texts for the classifier, the agents and the fallback
//!
//! The classifier instruction and the GraphQL instruction are assembled from
//! runtime data (registered agents, tool catalog, schema summary); the rest are
//! constants.

use crate::agents::AgentId;
use crate::llm::ToolDefinition;
use std::fmt::Write;

/// Reply used when an agent ran but left nothing to show
pub const APOLOGY: &str = "Sorry, no suitable response found.";

/// Persona for the weather agent
pub const WEATHER_PERSONA: &str = r#"You are a weather expert who handles weather-related queries.

Your tasks:
1. Understand the user's weather question
2. Provide weather information and advice
3. If the user asks about a specific city, give information relevant to that city

Example queries:
- "What's the weather like in Beijing today?"
- "Will it rain in Shanghai tomorrow?"
- "Weather forecast for New York"

Reply in a friendly way and say that you are the Weather Agent.
Note: this is a demo and you may need to simulate weather data. If the data is simulated, say so in the reply."#;

const CLASSIFIER_HEADER: &str = "You are an orchestrator that coordinates several agents to complete tasks.";

const CLASSIFIER_TASKS: &str = r#"Your task:
1. Analyze the user query
2. Decide which agent should handle it
3. Return the decision as a JSON object with an "agent_name" field

Example output:
{"agent_name": "weather_agent"}

If the query does not match any agent, return: {"agent_name": "none"}
Reply with the JSON object only."#;

const GRAPHQL_BASE: &str = r"You are a helpful data assistant that translates natural language questions into GraphQL queries.
You can use the tools provided to get the query schema, which helps you build the query statement.

You should:
  1. Understand what data the user is asking for
  2. Create a GraphQL query to retrieve that information
  3. Execute the query and present the results

All of the above steps can be done with the tools provided.

Be precise and focused in your responses.";

/// Build the classifier instruction listing the registered agents
pub fn classifier_instruction(agents: &[AgentId]) -> String {
    let mut prompt = String::from(CLASSIFIER_HEADER);
    prompt.push_str("\n\nAvailable agents:\n");
    for (i, agent) in agents.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}: {}", i + 1, agent.name(), agent.description());
    }
    prompt.push('\n');
    prompt.push_str(CLASSIFIER_TASKS);
    prompt
}

/// Prompt for the direct fallback answer when no agent matched
pub fn fallback_prompt(user_query: &str) -> String {
    format!(
        "The user asks: {user_query}\n\nAnswer the user's question directly, without using any specific agent."
    )
}

/// Build the GraphQL agent instruction from the tool catalog and optional schema summary
pub fn graphql_instruction(
    tools: &[ToolDefinition],
    endpoint_url: &str,
    schema_summary: Option<&str>,
) -> String {
    let mut prompt = String::from(GRAPHQL_BASE);

    let _ = write!(prompt, "\n\nGraphQL endpoint: {endpoint_url}");

    if let Some(summary) = schema_summary {
        prompt.push_str("\n\nSchema overview:\n");
        prompt.push_str(summary);
    }

    prompt.push_str("\n\nAvailable tools:\n");
    for tool in tools {
        let _ = writeln!(prompt, "- {}: {}", tool.name, tool.description);
    }

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    let _ = write!(prompt, "Tool names: {}", names.join(", "));

    prompt
}
