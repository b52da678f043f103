//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::watch::ChangeWatcher;
use crate::Blog;

/// Generate the static site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?;
    let written = generator.generate().await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages into {:?} in {:.2}s",
        written,
        blog.output_dir,
        duration.as_secs_f64()
    );

    Ok(())
}

/// Watch the source tree and config file, regenerating on change
pub async fn watch(blog: &Blog) -> Result<()> {
    if blog.is_remote() {
        anyhow::bail!("Cannot watch a remote content source");
    }

    let mut watcher = ChangeWatcher::new(&[blog.source_dir.clone(), blog.config_path()])?;
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut blog = blog.clone();
    while let Some(changed) = watcher.next_change().await {
        for path in &changed {
            tracing::info!("File changed: {}", path.display());
        }

        // Pick up configuration edits
        match Blog::new(&blog.base_dir) {
            Ok(reloaded) => blog = reloaded,
            Err(e) => tracing::warn!("Keeping previous configuration: {:#}", e),
        }

        if let Err(e) = run(&blog).await {
            tracing::error!("Generation failed: {:#}", e);
        }
    }

    Ok(())
}
