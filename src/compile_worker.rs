//! Compile Worker
//!
//! Hands emitted fragments to the external renderer for GPU compilation.
//! Requests are coalesced, not queued: the pending slot holds only the newest
//! fragment, so once the in-flight compile returns only the latest settled
//! topology is compiled. In-flight compiles are never cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::models::schema::ShaderFragment;

/// Implemented by the renderer that owns shader compile and link.
#[async_trait]
pub trait ShaderBackend: Send + Sync + 'static {
    async fn compile(&self, fragment: &ShaderFragment) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompileEvent {
    Started { generation: u64, hash: String },
    Finished { generation: u64, hash: String },
    Failed { generation: u64, hash: String, error: String },
    /// Fragment matched the one already on the GPU.
    Skipped { generation: u64, hash: String },
}

#[derive(Clone)]
struct CompileJob {
    generation: u64,
    fragment: ShaderFragment,
}

pub struct CompileWorker {
    jobs: watch::Sender<Option<CompileJob>>,
    stop_tx: mpsc::Sender<()>,
    generation: AtomicU64,
}

impl CompileWorker {
    /// Spawns the worker on the current tokio runtime. `callback` receives
    /// every `CompileEvent`.
    pub fn start<B: ShaderBackend>(
        backend: B,
        callback: impl Fn(CompileEvent) + Send + Sync + 'static,
    ) -> Self {
        let (jobs, mut job_rx) = watch::channel::<Option<CompileJob>>(None);
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let backend = Arc::new(backend);
        let callback = Arc::new(callback);

        tokio::spawn(async move {
            let mut compiled_hash: Option<String> = None;

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => break,
                    changed = job_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let Some(job) = job_rx.borrow_and_update().clone() else {
                            continue;
                        };
                        let hash = job.fragment.hash.clone();
                        let generation = job.generation;

                        if compiled_hash.as_deref() == Some(hash.as_str()) {
                            log::debug!("[compile_worker] #{generation} unchanged ({hash}), skipping");
                            callback(CompileEvent::Skipped { generation, hash });
                            continue;
                        }

                        log::info!("[compile_worker] #{generation} compiling {hash}");
                        callback(CompileEvent::Started { generation, hash: hash.clone() });
                        match backend.compile(&job.fragment).await {
                            Ok(()) => {
                                log::info!("[compile_worker] #{generation} done");
                                compiled_hash = Some(hash.clone());
                                callback(CompileEvent::Finished { generation, hash });
                            }
                            Err(error) => {
                                log::warn!("[compile_worker] #{generation} failed: {error}");
                                callback(CompileEvent::Failed { generation, hash, error });
                            }
                        }
                    }
                }
            }
        });

        Self {
            jobs,
            stop_tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Replaces any pending request with `fragment`. Returns its generation.
    pub fn submit(&self, fragment: ShaderFragment) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.jobs.send_replace(Some(CompileJob {
            generation,
            fragment,
        }));
        generation
    }

    pub async fn stop(&self) {
        let _ = self.stop_tx.send(()).await;
    }
}
