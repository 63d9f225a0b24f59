use crossbeam_channel::{bounded, Receiver, Sender};
use ignore::{overrides::OverrideBuilder, WalkBuilder, WalkState};
use std::{
    mem,
    path::{Path, PathBuf},
    thread,
};

use crate::errors::{TripwireError, TripwireResult};
use crate::utils::{is_solidity, Config};

type Batch = Vec<PathBuf>;

struct Batcher {
    tx:    Sender<Batch>,
    batch: Batch,
    size:  usize,
}
impl Batcher {
    fn push(&mut self, p: PathBuf) {
        self.batch.push(p);
        if self.batch.len() >= self.size {
            self.flush();
        }
    }
    fn flush(&mut self) {
        if !self.batch.is_empty() {
            let _ = self.tx.send(mem::take(&mut self.batch));
        }
    }
}
impl Drop for Batcher {
    fn drop(&mut self) { self.flush(); }
}

// ---------------------------------------------------------------------------
/// Walk `root` and send *batches* of Solidity paths through the returned channel.
pub fn spawn_senders(root: &Path, cfg: &Config) -> TripwireResult<Receiver<Batch>> {
    // ----- 1  build ignore/override rules ----------------------------------
    let mut ob = OverrideBuilder::new(root);
    for dir in &cfg.scanner.excluded_directories {
        if let Err(e) = ob.add(&format!("!**/{dir}/**")) {
            tracing::warn!("cannot add ignore pattern ‘{dir}’: {e}");
        }
    }
    for file in &cfg.scanner.excluded_files {
        if let Err(e) = ob.add(&format!("!{file}")) {
            tracing::warn!("cannot add ignore pattern ‘{file}’: {e}");
        }
    }
    let overrides = ob
        .build()
        .map_err(|e| TripwireError::Other(format!("invalid exclusion rules: {e}")))?;

    // ----- 2  channel & thread pool parameters -----------------------------
    let workers     = cfg.performance.worker_threads.unwrap_or_else(num_cpus::get).max(1);
    let (tx, rx)    = bounded::<Batch>(workers * cfg.performance.channel_multiplier.max(1));

    let root        = root.to_path_buf();
    let scan_hidden = cfg.scanner.scan_hidden_files;
    let follow      = cfg.scanner.follow_symlinks;
    let vcsignore   = cfg.scanner.read_vcsignore;
    let batch_size  = cfg.performance.batch_size.max(1);
    let max_bytes   = cfg.scanner.max_file_size_mb.unwrap_or(0) * 1_048_576;

    // ----- 3  the background walker thread ---------------------------------
    thread::spawn(move || {
        WalkBuilder::new(root)
          .hidden(!scan_hidden)
          .follow_links(follow)
          .git_ignore(vcsignore)
          .threads(workers)
          .overrides(overrides)
          .build_parallel()
          .run(move || {
              let mut b = Batcher {
                  tx:    tx.clone(),
                  batch: Vec::with_capacity(batch_size),
                  size:  batch_size,
              };

              Box::new(move |entry| {
                  let entry = match entry {
                      Ok(e) if e.file_type().is_some_and(|ft| ft.is_file()) => e,
                      Ok(_) => return WalkState::Continue,
                      Err(e) => {
                          tracing::debug!("walk error: {e}");
                          return WalkState::Continue;
                      }
                  };
                  if !is_solidity(entry.path()) {
                      return WalkState::Continue;
                  }

                  if max_bytes != 0 {
                      match entry.metadata() {
                          Ok(m) if m.len() > max_bytes => {
                              tracing::debug!("skipping oversized {:?}", entry.path());
                              return WalkState::Continue;
                          }
                          Err(e) => {
                              tracing::debug!("metadata failed for {:?}: {e}", entry.path());
                              return WalkState::Continue;
                          }
                          _ => {}
                      }
                  }

                  tracing::debug!("sending {:?}", entry.path());
                  b.push(entry.into_path());
                  WalkState::Continue
              })
          });
    });

    Ok(rx)
}

/// Every Solidity file under `root`, sorted so output order is stable.
pub fn collect_sources(root: &Path, cfg: &Config) -> TripwireResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = spawn_senders(root, cfg)?.into_iter().flatten().collect();
    paths.sort();
    Ok(paths)
}

#[test]
fn collects_only_solidity_outside_excluded_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("contracts/nested")).unwrap();
    std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    std::fs::write(root.join("contracts/Token.sol"), "contract Token {}").unwrap();
    std::fs::write(root.join("contracts/nested/Vault.SOL"), "contract Vault {}").unwrap();
    std::fs::write(root.join("contracts/notes.md"), "# notes").unwrap();
    std::fs::write(root.join("node_modules/pkg/Dep.sol"), "contract Dep {}").unwrap();

    let cfg = Config::default();
    let found = collect_sources(root, &cfg).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, ["contracts/Token.sol", "contracts/nested/Vault.SOL"]);
}

#[test]
fn oversized_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("Big.sol"), vec![b' '; 1_048_577]).unwrap();
    std::fs::write(root.join("Small.sol"), "contract Small {}").unwrap();

    let mut cfg = Config::default();
    cfg.scanner.max_file_size_mb = Some(1);
    let found = collect_sources(root, &cfg).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("Small.sol"));
}
