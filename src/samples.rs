//! Sample images used by the vision recipes.

use crate::client::GlmClient;
use crate::images::{ImageRequest, DEFAULT_IMAGE_SIZE};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const IMAGE_UNDERSTANDING: &str = "image_understanding.jpg";
pub const MULTI_IMAGE_1: &str = "multi_image_1.jpg";
pub const MULTI_IMAGE_2: &str = "multi_image_2.jpg";
pub const OBJECT_DETECTION: &str = "object_detection.jpg";

/// File name and generation prompt of every sample image.
pub const SAMPLE_PROMPTS: [(&str, &str); 4] = [
    (
        IMAGE_UNDERSTANDING,
        "A serene Japanese garden with a wooden bridge over a koi pond, cherry blossom trees in \
         full bloom, traditional stone lanterns, and a small pagoda in the background. Morning \
         light filtering through the trees.",
    ),
    (
        MULTI_IMAGE_1,
        "A modern minimalist living room with a white sofa, wooden coffee table, large windows \
         with natural light, indoor plants, and abstract wall art. Clean Scandinavian design \
         aesthetic.",
    ),
    (
        MULTI_IMAGE_2,
        "A cozy traditional living room with a brown leather couch, vintage wooden furniture, \
         brick fireplace, warm lighting from table lamps, and bookshelves filled with books. \
         Rustic cottage style.",
    ),
    (
        OBJECT_DETECTION,
        "A busy city street scene with pedestrians crossing a crosswalk, cars and taxis parked \
         along the road, street signs, traffic lights, a food cart vendor, bicycles, and \
         storefronts with colorful awnings. Clear daylight, multiple distinct objects visible.",
    ),
];

/// Pause between generation requests.
pub const GENERATION_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SampleAssets {
    dir: PathBuf,
}

impl SampleAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Path of an existing sample, or `MissingAsset` pointing at `samples`.
    pub fn require(&self, name: &str) -> Result<PathBuf> {
        let path = self.path(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::missing_asset(path))
        }
    }
}

/// Outcome for one sample file.
#[derive(Debug)]
pub struct SampleOutcome {
    pub file: &'static str,
    pub result: Result<PathBuf>,
}

impl SampleOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Generate, download and save every sample image.
///
/// A failure is recorded for its file and the remaining files are still
/// attempted. `on_outcome` sees each result as soon as it is known.
pub async fn generate_samples<F>(
    client: &GlmClient,
    assets: &SampleAssets,
    pause: Duration,
    mut on_outcome: F,
) -> Result<Vec<SampleOutcome>>
where
    F: FnMut(&SampleOutcome),
{
    tokio::fs::create_dir_all(assets.dir()).await?;

    let mut outcomes = Vec::with_capacity(SAMPLE_PROMPTS.len());
    for (i, (file, prompt)) in SAMPLE_PROMPTS.iter().copied().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        info!(file, "generating sample image");
        let result = generate_one(client, prompt, &assets.path(file)).await;
        if let Err(e) = &result {
            warn!(file, error = %e, "sample generation failed");
        }
        let outcome = SampleOutcome { file, result };
        on_outcome(&outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

async fn generate_one(client: &GlmClient, prompt: &str, dest: &Path) -> Result<PathBuf> {
    let image = client
        .generate_image(ImageRequest::new(prompt).size(DEFAULT_IMAGE_SIZE))
        .await?;
    let url = image
        .first_url()
        .ok_or_else(|| Error::runtime("No image URL in response"))?;
    let bytes = client.download(url).await?;
    tokio::fs::write(dest, &bytes).await?;
    Ok(dest.to_path_buf())
}
