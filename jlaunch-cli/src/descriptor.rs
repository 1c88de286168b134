use jlaunch_engine::{DownloadKind, Resource};
use jnlp::{JarDownload, JnlpFile};
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::error::AppError;

/// Download and parse the descriptor at `url`
///
/// Relative codebases resolve against the URL the descriptor was finally
/// served from, after redirects.
pub async fn fetch_descriptor(client: &Client, url: &Url) -> Result<JnlpFile, AppError> {
    info!(url = %url, "Fetching descriptor");

    let response = client.get(url.clone()).send().await?.error_for_status()?;
    let source = response.url().clone();
    let body = response.text().await?;

    let jnlp = JnlpFile::parse(&body, Some(&source))?;
    info!(
        codebase = %jnlp.codebase,
        jars = jnlp.jars.len(),
        main_class = %jnlp.application.main_class,
        "Descriptor loaded"
    );
    Ok(jnlp)
}

/// Cache resources for every jar of `jnlp`, in descriptor order
pub fn jar_resources(jnlp: &JnlpFile) -> Result<Vec<Resource>, AppError> {
    jnlp.jars
        .iter()
        .map(|jar| -> Result<Resource, AppError> {
            Ok(Resource::new(jnlp.jar_url(jar)?)
                .with_main(jar.main)
                .with_download(download_kind(jar.download)))
        })
        .collect()
}

fn download_kind(download: JarDownload) -> DownloadKind {
    match download {
        JarDownload::Eager => DownloadKind::Eager,
        JarDownload::Progress => DownloadKind::Progress,
        JarDownload::Lazy => DownloadKind::Lazy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jar_resources_keep_order_and_kind() {
        let xml = r#"<jnlp codebase="https://example.org/app/">
            <resources>
              <jar href="main.jar" main="true"/>
              <jar href="docs.jar" download="lazy"/>
              <jar href="https://cdn.example.org:8443/big.jar" download="progress"/>
            </resources>
            <application-desc main-class="Main"/>
        </jnlp>"#;
        let jnlp = JnlpFile::parse(xml, None).unwrap();

        let resources = jar_resources(&jnlp).unwrap();
        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0].url.as_str(), "https://example.org/app/main.jar");
        assert!(resources[0].main);
        assert_eq!(resources[1].download, DownloadKind::Lazy);
        assert!(resources[1].is_deferred());
        assert_eq!(resources[2].url.port(), Some(8443));
        assert_eq!(resources[2].download, DownloadKind::Progress);
        assert!(!resources[2].is_deferred());
    }
}
