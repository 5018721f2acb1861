use anyhow::Result;
use serde_json::json;

use crate::model::{Configuration, NewConfig, NewSurvey, NewTag, ValueMap};
use crate::store::Store;

const DEMO_TAG: &str = "default";

fn object(value: serde_json::Value) -> ValueMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => ValueMap::new(),
    }
}

fn theme_config() -> Configuration {
    NewConfig {
        key: Some("base-theme".to_string()),
        alias: Some("theme".to_string()),
        values: object(json!({
            "themeOpts": {
                "PrimaryColor": "#355EC0",
                "SecondaryColor": "#49709E",
                "SurveyTopBrandImage": {
                    "url": "/logo.png",
                    "alt": "OpenNPS",
                    "width": "128px"
                }
            }
        })),
    }
    .into_config()
}

fn templates_config() -> Configuration {
    NewConfig {
        key: Some("base-templates".to_string()),
        alias: Some("templates".to_string()),
        values: object(json!({
            "templates": {
                "CoreQuestionPhrase":
                    "How likely are you to recommend {{target}} to a friend or colleague?",
                "SurveyCommentText": "Would you like to tell us why?",
                "SurveyCommentLabel": "Comment",
                "SurveyCommentPlaceholder": "Your feedback",
                "SendButtonMessage": "Send"
            }
        })),
    }
    .into_config()
}

/// Insert a demonstration data set: a theme config, a templates
/// config, a tag stacking both and one open survey. Safe to call on
/// every boot; a store that already holds the tag is left untouched.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    if store.get_tag(DEMO_TAG).await?.is_some() {
        log::info!("seed data already present, skipping");
        return Ok(());
    }

    let theme = theme_config();
    let templates = templates_config();
    let override_configs = vec![theme.id.clone(), templates.id.clone()];

    store.insert_config(theme).await?;
    store.insert_config(templates).await?;

    store
        .insert_tag(
            NewTag {
                name: DEMO_TAG.to_string(),
                override_configs,
            }
            .into_tag(),
        )
        .await?;

    let survey = NewSurvey {
        reviewer: "ada@example.com".to_string(),
        target: "OpenNPS".to_string(),
        tag: Some(DEMO_TAG.to_string()),
    }
    .into_survey();
    log::info!("seeded demo survey {}", survey.id);
    store.insert_survey(survey).await?;

    Ok(())
}
