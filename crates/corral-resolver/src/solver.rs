use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use corral_analyzer::{external_reach, ReachOptions};
use corral_types::{Constraint, Lock, LockedProject, Manifest, PackageTree, ProjectRoot, Version};

use crate::bridge::Bridge;
use crate::error::{ConflictingConstraint, SolveError, SolveFailure};
use crate::memo;
use crate::selection::{Selection, VersionsQueue};

/// Which direction to prefer when ordering semver candidates (spec §4.4's
/// "Version ordering", rule 2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChangePolicy {
    #[default]
    Upgrade,
    Downgrade,
}

/// Parameters that shape a solve without changing the algorithm: whether to
/// prefer newer or older semver candidates, and a prior lock to pin against
/// when present and still valid.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    pub policy: ChangePolicy,
    pub prior_lock: Option<Lock>,
}

struct Conflict {
    project: ProjectRoot,
    parents: Vec<ProjectRoot>,
    constraints: Vec<ConflictingConstraint>,
}

/// The solver's mutable search state. Everything here is rebuilt from
/// scratch for each call to [`solve`]; nothing persists between solves
/// except through the `Bridge` it is handed.
struct Solver<'a> {
    bridge: &'a dyn Bridge,
    options: SolveOptions,

    selections: Vec<Selection>,
    versions_queues: FxHashMap<ProjectRoot, VersionsQueue>,
    unselected: VecDeque<ProjectRoot>,
    queued: FxHashSet<ProjectRoot>,
    failures: FxHashSet<(ProjectRoot, String)>,
}

/// Computes the memo digest for a root project on its own, without
/// resolving anything — the same inputs [`solve`] hashes before it does any
/// network or cache I/O. Used by the offline `status`/`hash-inputs`
/// commands, which compare against or print this digest without touching
/// a [`Bridge`] at all.
pub fn root_memo(root: &ProjectRoot, manifest: &Manifest, tree: &PackageTree) -> String {
    let ignore = resolve_ignore_set(tree, manifest);
    let reach = external_reach(tree, &ignore, ReachOptions::default());
    let mut externals = reach.all_externals();
    externals.extend(manifest.required.iter().cloned());
    externals.sort();
    externals.dedup();
    memo::compute(root, manifest, &externals)
}

/// Runs the main loop described in spec §4.4 to completion, returning the
/// resulting [`Lock`] or the structured failure recorded when the search
/// exhausted.
pub async fn solve(bridge: &dyn Bridge, options: SolveOptions) -> Result<Lock, SolveError> {
    let mut solver = Solver {
        bridge,
        options,
        selections: Vec::new(),
        versions_queues: FxHashMap::default(),
        unselected: VecDeque::new(),
        queued: FxHashSet::default(),
        failures: FxHashSet::default(),
    };
    solver.run().await
}

impl<'a> Solver<'a> {
    async fn run(&mut self) -> Result<Lock, SolveError> {
        let root = self.bridge.root().clone();
        let root_manifest = self.bridge.root_manifest().clone();
        let root_tree = self.bridge.root_tree().clone();

        let ignore = resolve_ignore_set(&root_tree, &root_manifest);
        let reach = external_reach(&root_tree, &ignore, ReachOptions::default());
        let mut externals = reach.all_externals();
        externals.extend(root_manifest.required.iter().cloned());
        externals.sort();
        externals.dedup();

        let memo = memo::compute(&root, &root_manifest, &externals);

        self.selections.push(Selection::new(
            root.clone(),
            Version::revision("root"),
            root_manifest,
            externals.clone(),
            0,
        ));
        self.queued.insert(root);
        self.enqueue_from_externals(&externals).await?;

        loop {
            let Some(project) = self.pick_next_unselected() else {
                return self.build_lock(memo).await;
            };

            match self.try_select(&project).await? {
                Ok(()) => continue,
                Err(conflict) => self.backjump(conflict)?,
            }
        }
    }

    fn pick_next_unselected(&mut self) -> Option<ProjectRoot> {
        while let Some(project) = self.unselected.pop_front() {
            if self.selections.iter().any(|s| s.project == project) {
                continue;
            }
            return Some(project);
        }
        None
    }

    async fn try_select(&mut self, project: &ProjectRoot) -> Result<Result<(), Conflict>, SolveError> {
        let (constraint, conflicts) = self.compute_constraint(project);
        if constraint == Constraint::None {
            return Ok(Err(Conflict {
                project: project.clone(),
                parents: conflicts.iter().map(|c| c.parent.clone()).collect(),
                constraints: conflicts,
            }));
        }

        if !self.versions_queues.contains_key(project) {
            let candidates = self.order_versions(project, self.bridge.list_versions(project).await?);
            self.versions_queues.insert(project.clone(), VersionsQueue::new(candidates));
        }

        let picked = loop {
            let queue = self.versions_queues.get_mut(project).unwrap();
            if queue.cursor >= queue.candidates.len() {
                break None;
            }
            let version = queue.candidates[queue.cursor].clone();
            let idx = queue.cursor;
            queue.cursor += 1;
            if !constraint.matches(&version) {
                continue;
            }
            if self.failures.contains(&(project.clone(), version.to_string())) {
                continue;
            }
            break Some((idx, version));
        };

        let Some((idx, version)) = picked else {
            return Ok(Err(Conflict {
                project: project.clone(),
                parents: conflicts.iter().map(|c| c.parent.clone()).collect(),
                constraints: conflicts,
            }));
        };

        let (manifest, _lock) = self.bridge.get_manifest_and_lock(project, &version).await?;
        let manifest = manifest.unwrap_or_default();
        let tree = self.bridge.list_packages(project, &version).await?;
        let ignore = resolve_ignore_set(&tree, &manifest);
        let reach = external_reach(&tree, &ignore, ReachOptions::default());
        let mut externals = reach.all_externals();
        externals.extend(manifest.required.iter().cloned());
        externals.sort();
        externals.dedup();

        self.enqueue_from_externals(&externals).await?;
        self.selections.push(Selection::new(
            project.clone(),
            version,
            manifest,
            externals,
            idx,
        ));
        Ok(Ok(()))
    }

    /// Adds the owning project of every external import to the unselected
    /// queue, unless it is already selected or already queued.
    async fn enqueue_from_externals(&mut self, externals: &[String]) -> Result<(), SolveError> {
        let mut owners = FxHashSet::default();
        for import in externals {
            let owner = self.bridge.deduce_project_root(import).await?;
            owners.insert(owner);
        }
        for owner in owners {
            if self.queued.insert(owner.clone()) {
                self.unselected.push_back(owner);
            }
        }
        Ok(())
    }

    /// Intersects (a) the root's overrides for `project`, then (b) the
    /// constraints every currently selected parent's manifest imposes on
    /// it, but only from parents that actually reach it through a live
    /// external import.
    fn compute_constraint(&self, project: &ProjectRoot) -> (Constraint, Vec<ConflictingConstraint>) {
        let mut constraint = Constraint::Any;
        let mut contributors = Vec::new();

        let root = self.bridge.root();
        if let Some(props) = self.bridge.root_manifest().overrides.get(project) {
            constraint = constraint.intersect(&props.constraint);
            contributors.push(ConflictingConstraint {
                parent: root.clone(),
                constraint: props.constraint.clone(),
            });
        }

        for selection in &self.selections {
            let Some(props) = selection.manifest.dependency_constraints.get(project) else {
                continue;
            };
            if !selection.reaches(project) {
                continue;
            }
            constraint = constraint.intersect(&props.constraint);
            contributors.push(ConflictingConstraint {
                parent: selection.project.clone(),
                constraint: props.constraint.clone(),
            });
        }

        (constraint, contributors)
    }

    /// Orders candidate versions per spec §4.4: prior-lock pin first, then
    /// semver descending (ascending under `Downgrade`), then other tags
    /// descending lexicographically, then non-default branches
    /// lexicographically with the default branch last, then bare
    /// revisions in discovery order.
    fn order_versions(&self, project: &ProjectRoot, candidates: Vec<Version>) -> Vec<Version> {
        let mut semver: Vec<Version> = Vec::new();
        let mut tags: Vec<Version> = Vec::new();
        let mut branches: Vec<Version> = Vec::new();
        let mut revisions: Vec<Version> = Vec::new();

        for v in candidates {
            if v.as_semver().is_some() {
                semver.push(v);
            } else if v.as_branch().is_some() {
                branches.push(v);
            } else if matches!(v, Version::Revision(_)) {
                revisions.push(v);
            } else {
                tags.push(v);
            }
        }

        semver.sort_by(|a, b| a.as_semver().cmp(&b.as_semver()));
        if self.options.policy == ChangePolicy::Upgrade {
            semver.reverse();
        }

        tags.sort_by(|a, b| plain_tag(b).cmp(plain_tag(a)));

        branches.sort_by(|a, b| {
            let (name_a, default_a) = a.as_branch().unwrap();
            let (name_b, default_b) = b.as_branch().unwrap();
            default_a.cmp(&default_b).then_with(|| name_a.cmp(name_b))
        });

        let mut ordered = Vec::with_capacity(semver.len() + tags.len() + branches.len() + revisions.len());
        ordered.extend(semver);
        ordered.extend(tags);
        ordered.extend(branches);
        ordered.extend(revisions);

        if let Some(pin) = self.prior_pin(project) {
            if let Some(pos) = ordered.iter().position(|v| v.underlying_revision() == Some(pin.as_str())) {
                let v = ordered.remove(pos);
                ordered.insert(0, v);
            }
        }

        ordered
    }

    fn prior_pin(&self, project: &ProjectRoot) -> Option<String> {
        self.options
            .prior_lock
            .as_ref()?
            .find(project)
            .and_then(|locked| locked.version.underlying_revision())
            .map(str::to_string)
    }

    /// Pops selections until the topmost contributor to `conflict` has been
    /// removed, restoring each popped project's cursor (advancing the
    /// contributor's one step past the version that failed) and re-queuing
    /// every popped project, including the one that originally failed.
    fn backjump(&mut self, conflict: Conflict) -> Result<(), SolveError> {
        if conflict.parents.is_empty() {
            return Err(SolveError::Solve(SolveFailure {
                project: conflict.project,
                conflicts: conflict.constraints,
                cursor: self.selections.len(),
            }));
        }

        loop {
            let Some(top) = self.selections.pop() else {
                return Err(SolveError::Solve(SolveFailure {
                    project: conflict.project,
                    conflicts: conflict.constraints,
                    cursor: 0,
                }));
            };
            self.queued.remove(&top.project);
            let is_target = conflict.parents.contains(&top.project);
            if is_target {
                self.failures.insert((top.project.clone(), top.version.to_string()));
            }
            if let Some(queue) = self.versions_queues.get_mut(&top.project) {
                // A non-target pop is restored to where its selection left
                // off, so it picks up the same candidate again once the
                // context above it has changed. The target's cursor
                // advances past the version that contributed to the
                // conflict, forcing a different one next time.
                queue.cursor = top.cursor_at_selection + usize::from(is_target);
            }
            self.unselected.push_front(top.project.clone());
            self.queued.insert(top.project.clone());
            if is_target {
                break;
            }
        }

        self.queued.insert(conflict.project.clone());
        self.unselected.push_front(conflict.project);
        Ok(())
    }

    async fn build_lock(&self, memo: String) -> Result<Lock, SolveError> {
        let mut projects = Vec::new();
        for selection in &self.selections {
            if selection.project == *self.bridge.root() {
                continue;
            }
            let tree = self.bridge.list_packages(&selection.project, &selection.version).await?;
            let packages = owned_packages(&selection.project, &tree);
            projects.push(LockedProject::new(selection.project.clone(), selection.version.clone(), packages));
        }
        Ok(Lock::new(memo, projects))
    }
}

/// The plain tag text of a version that is neither semver nor a branch —
/// i.e. an opaque tag string, however it happens to be paired.
fn plain_tag(v: &Version) -> &str {
    match v {
        Version::Unpaired(corral_types::UnpairedVersion::Plain(t)) => t,
        Version::Paired(p) => match &p.unpaired {
            corral_types::UnpairedVersion::Plain(t) => t,
            _ => "",
        },
        _ => "",
    }
}

/// The set of import paths belonging to `project` that actually produced a
/// healthy package entry in `tree`, expressed relative to the project root
/// (`"."` for the root package itself), matching the lock's `packages`
/// field (spec §6).
fn owned_packages(project: &ProjectRoot, tree: &PackageTree) -> Vec<String> {
    tree.healthy_paths()
        .filter(|path| project.owns(path))
        .map(|path| {
            if path.as_str() == project.as_str() {
                ".".to_string()
            } else {
                path.trim_start_matches(project.as_str()).trim_start_matches('/').to_string()
            }
        })
        .collect()
}

/// The set of import paths (internal and external) that a project's own
/// manifest marks ignored, resolved against its tree so [`external_reach`]
/// can treat them as absent by exact match rather than by glob.
fn resolve_ignore_set(tree: &PackageTree, manifest: &Manifest) -> FxHashSet<String> {
    let mut ignore = FxHashSet::default();
    for (path, entry) in tree.iter() {
        if manifest.is_ignored(path) {
            ignore.insert(path.clone());
        }
        if let Ok(package) = entry {
            for import in package.imports.iter().chain(&package.test_imports) {
                if manifest.is_ignored(import) {
                    ignore.insert(import.clone());
                }
            }
        }
    }
    ignore
}
