// SPDX-License-Identifier: GPL-2.0-or-later
//
// Relays a clip's remote audio to the client.
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{error, info, instrument};

use crate::{db::ClipRepository, metrics::Metrics};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A clip's audio, fully buffered and ready to hand to the client.
#[derive(Debug)]
pub struct StreamedClip {
    /// The clip as it was after its play count was incremented.
    pub clip: crate::db::Clip,
    pub audio: Bytes,
}

impl StreamedClip {
    /// The `Content-Disposition` value for the download; the filename is the clip title.
    pub fn content_disposition(&self) -> String {
        let filename: String = self
            .clip
            .title
            .chars()
            .map(|c| match c {
                '"' | '\\' => '_',
                c if c.is_ascii_graphic() || c == ' ' => c,
                _ => '_',
            })
            .collect();
        format!("attachment; filename=\"{filename}.mp3\"")
    }
}

/// Fetches remote audio on behalf of clients.
#[derive(Clone, Debug)]
pub struct StreamProxy {
    client: reqwest::Client,
}

impl StreamProxy {
    /// Create a proxy whose fetches give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, crate::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| {
                crate::Error::ConfigValueError(format!("unable to build the HTTP client: {err}"))
            })?;
        Ok(Self { client })
    }

    /// Download the whole resource at `url`. Any transport failure or non-success status is an
    /// [`crate::Error::UpstreamFetch`].
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Bytes, crate::Error> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(upstream_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(crate::Error::UpstreamFetch(format!(
                "Failed to retrieve audio file: upstream responded with {status}"
            )));
        }

        response.bytes().await.map_err(upstream_error)
    }

    /// Count a play of the clip, then fetch its audio.
    ///
    /// The play is counted before the fetch and stays counted if the fetch fails. Stream
    /// metrics are only recorded once the audio has been retrieved.
    #[instrument(skip(self, repository, metrics))]
    pub async fn stream(
        &self,
        repository: &dyn ClipRepository,
        metrics: &Metrics,
        id: i64,
    ) -> Result<StreamedClip, crate::Error> {
        let clip = repository.increment_play_count(id).await?;

        let start = Instant::now();
        let audio = match self.fetch(&clip.audio_url).await {
            Ok(audio) => audio,
            Err(err) => {
                error!(clip = clip.id, url = %clip.audio_url, "Failed to fetch clip audio: {}", err);
                return Err(err);
            }
        };
        let elapsed = start.elapsed();

        metrics.record_stream(clip.id, &clip.title, elapsed);
        info!(
            clip = clip.id,
            bytes = audio.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Streamed clip"
        );

        Ok(StreamedClip { clip, audio })
    }
}

/// Flatten a reqwest error and its source chain (timeouts, refused connections) into one message.
fn upstream_error(err: reqwest::Error) -> crate::Error {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    crate::Error::UpstreamFetch(message)
}
