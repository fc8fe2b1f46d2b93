//! Plain-language brief for residents about a site alert.

use std::fmt::Display;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use super::{json_instructions, require_non_empty, Flow, Validate, Violation};
use crate::models::Alert;

// ---

pub struct CommunityBrief;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityBriefInput {
    pub alert_type: String,
    pub alert_details: String,
    pub mitigation_plan: String,
    pub community_impact: String,
    pub site_name: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityBriefOutput {
    pub community_brief: String,
}

impl CommunityBriefInput {
    /// Brief request for an alert from the log, dated in `tz`.
    pub fn for_alert<Tz>(alert: &Alert, site_name: &str, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            alert_type: alert.title.clone(),
            alert_details: alert.description.clone(),
            mitigation_plan: alert.mitigation_plan.clone(),
            community_impact: alert.community_impact.clone(),
            site_name: site_name.to_string(),
            date: alert
                .timestamp
                .with_timezone(tz)
                .format("%-m/%-d/%Y")
                .to_string(),
        }
    }
}

/// Download name for a generated brief.
pub fn brief_file_name(alert_id: &str) -> String {
    format!("community-brief-{}.txt", alert_id)
}

impl Validate for CommunityBriefInput {
    fn validate(&self) -> Result<(), Violation> {
        require_non_empty("alertType", &self.alert_type)?;
        require_non_empty("siteName", &self.site_name)
    }
}

impl Validate for CommunityBriefOutput {
    fn validate(&self) -> Result<(), Violation> {
        require_non_empty("communityBrief", &self.community_brief)
    }
}

impl Flow for CommunityBrief {
    const NAME: &'static str = "community_brief";
    const SYSTEM: &'static str =
        "You are the community relations lead for a construction company. You write short, \
         calm, jargon-free notices for people living next to a building site.";

    type Input = CommunityBriefInput;
    type Output = CommunityBriefOutput;

    fn prompt(input: &CommunityBriefInput) -> String {
        let mut prompt = format!(
            "An alert was raised on one of our sites. Write a notice of at most 200 words for \
             local residents covering what happened, what we are doing about it and how it may \
             affect them. It will be sent as a plain text file, so do not use Markdown.\n\n\
             Site: {}\nDate: {}\nAlert: {}\nDetails: {}\nMitigation plan: {}\nCommunity impact: {}",
            input.site_name,
            input.date,
            input.alert_type,
            input.alert_details,
            input.mitigation_plan,
            input.community_impact,
        );
        prompt.push_str(&json_instructions(r#"{ "communityBrief": "<notice text>" }"#));
        prompt
    }
}
