use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    clap::Args,
    fxbot_config::FxbotConfig,
    fxbot_soundgen::{DecodedAudio, GenerationRequest, SoundGenerator, decode_all},
    tracing::info,
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Description of the sound to generate.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Requested clip length in seconds (service decides when omitted).
    #[arg(long)]
    pub duration: Option<u32>,

    /// How closely to follow the prompt, 0.0 to 1.0 (overrides config).
    #[arg(long)]
    pub prompt_influence: Option<f64>,

    /// Directory the clips are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

pub async fn handle_generate(
    generator: &dyn SoundGenerator,
    config: &FxbotConfig,
    args: GenerateArgs,
) -> Result<()> {
    let mut request = GenerationRequest::new(args.text.join(" "))?.with_prompt_influence(
        args.prompt_influence
            .unwrap_or(config.generation.prompt_influence),
    )?;
    if let Some(seconds) = args.duration {
        request = request.with_duration_seconds(seconds)?;
    }

    let response = generator.generate(&request).await?;
    let audios = decode_all(&response.items)?;
    if audios.is_empty() {
        eprintln!("The service returned an empty result, try again.");
        return Ok(());
    }

    for path in write_audios(&args.out_dir, &audios)? {
        println!("{}", path.display());
    }
    Ok(())
}

/// Write each clip to `<dir>/<id>.mp3`, creating `dir` if needed.
fn write_audios(dir: &Path, audios: &[DecodedAudio]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    audios
        .iter()
        .map(|audio| {
            let path = dir.join(file_name(&audio.id));
            std::fs::write(&path, &audio.data)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = audio.data.len(), "audio written");
            Ok(path)
        })
        .collect()
}

/// Item ids come from the service; keep only filename-safe characters.
fn file_name(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "audio.mp3".to_string()
    } else {
        format!("{stem}.mp3")
    }
}
