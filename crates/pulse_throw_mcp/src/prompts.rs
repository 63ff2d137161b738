use rmcp::model::{GetPromptResult, PromptMessage, PromptMessageRole};

pub fn workload_check_prompt(user_id: Option<&str>, days_back: u32) -> GetPromptResult {
    let athlete = user_id.unwrap_or("the account owner");
    let user_arg = match user_id {
        Some(id) => format!(" with user_ids=[\"{}\"]", id),
        None => String::new(),
    };
    GetPromptResult::new(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Review the throwing workload of {} over the past {} days.\n\nFocus on:\n1. Acute workload, chronic workload and the acute:chronic ratio on the latest day\n2. How the ratio moved day to day (spikes above 1.3 or drops below 0.8)\n3. Share of high-effort throws and which tags carry the most workload\n4. Days without throwing and how they affect the averages\n5. A recommendation for the next few days of throwing\n\nUse get_workload_metrics and get_workload_history with days_back={}{}, then sum_workload over the last week (split by high_effort) for context. Present findings in a short, actionable format.",
                athlete, days_back, days_back, user_arg
            ),
        )]).with_description(format!(
            "Throwing workload check for {} over the past {} days",
            athlete, days_back
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_account_owner() {
        let res = workload_check_prompt(None, 42);
        let description = res.description.unwrap();
        assert!(description.contains("the account owner"));
        assert!(description.contains("42 days"));
    }
}
