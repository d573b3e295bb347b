use dialoguer::{Input, Password, Select};
use newsrag_core::vault::Secret;
use newsrag_core::{Config, Pipeline, PipelineError};

use crate::render;

const ACTIONS: [&str; 3] = ["Process URLs", "Ask a question", "Quit"];

pub(crate) async fn run(mut config: Config) -> anyhow::Result<()> {
    println!("newsrag - news article research assistant\n");

    if config.secrets.openai_api_key.is_none() {
        let raw = Password::new()
            .with_prompt("OpenAI API key")
            .allow_empty_password(true)
            .interact()?;
        if !raw.trim().is_empty() {
            config.secrets.openai_api_key = Some(Secret::new(raw.trim()));
        }
    }
    let pipeline = Pipeline::from_config(&config)?;

    loop {
        let choice = Select::new()
            .with_prompt("What next?")
            .items(ACTIONS)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let urls = prompt_urls(config.loader.max_urls)?;
                println!("Processing...");
                match pipeline.build(&urls).await {
                    Ok(outcome) => println!("{}\n", render::build_outcome(&outcome)),
                    Err(e) => report_error(&e),
                }
            }
            1 => {
                let question: String = Input::new()
                    .with_prompt("Question")
                    .allow_empty(true)
                    .interact_text()?;
                if question.trim().is_empty() {
                    continue;
                }
                match pipeline.ask(&question).await {
                    Ok(result) => println!("{}\n", render::answer(&result)),
                    Err(e) => report_error(&e),
                }
            }
            _ => break,
        }
    }
    Ok(())
}

fn prompt_urls(fields: usize) -> anyhow::Result<Vec<String>> {
    let mut urls = Vec::with_capacity(fields);
    for i in 1..=fields {
        let url: String = Input::new()
            .with_prompt(format!("URL {i} (blank to skip)"))
            .allow_empty(true)
            .interact_text()?;
        urls.push(url);
    }
    Ok(urls)
}

fn report_error(e: &PipelineError) {
    tracing::debug!("action failed: {e:?}");
    eprintln!("Error: {e}\n");
}
