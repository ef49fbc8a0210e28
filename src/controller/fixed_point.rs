//! Damped fixed point iteration on a time slab.
//!
//! `FixedPoint` is the context of the state machine: it orchestrates the
//! bounded iteration at all three hierarchy levels, owns the limits and
//! tolerances, owns the active strategy, and performs state transitions.
//! The loop has the same shape at every level: update, record the residual,
//! test convergence, test divergence (switching strategy on a positive
//! verdict), stabilize.
//!
//! Numerical non-convergence is a normal outcome reported through the
//! boolean return of `iterate_*`; a child level that exhausts its budget
//! propagates `false` upward without retry.

use std::fmt;

use num_traits::Float;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::{IterConfig, SwitchPolicy};
use crate::core::{Rhs, Solution};
use crate::error::FixError;
use crate::hierarchy::{Element, ElementGroup, Level, TimeSlab};
use crate::strategy::{Mode, Strategy, StrategyKind};
use crate::utils::{IterStats, Residuals};

/// Fixed point iteration controller.
///
/// Holds non-owning references to the solution and right-hand side for the
/// lifetime of a solve. One strategy is active at a time, shared across all
/// hierarchy levels of a single `iterate_*` call.
pub struct FixedPoint<'a, R, S, T> {
    /// Solution of the previous slab, read during `init_*`.
    u: &'a S,
    /// Right-hand side of the fixed point map.
    f: &'a R,
    cfg: IterConfig<T>,
    state: Strategy<T>,
    /// Component values mirrored for RHS evaluation, indexed by component id.
    values: Vec<T>,
    stats: IterStats<T>,
    monitor: Option<Box<dyn FnMut(usize, T) + 'a>>,
    residual_history: Vec<T>,
}

impl<'a, R, S, T> FixedPoint<'a, R, S, T>
where
    R: Rhs<T>,
    S: Solution<T>,
    T: Float + From<f64> + fmt::Debug + Send + Sync,
{
    /// New controller over `u` and `f`. Fails fast on invalid configuration.
    pub fn new(u: &'a S, f: &'a R, cfg: IterConfig<T>) -> Result<Self, FixError> {
        cfg.validate()?;
        let state = Strategy::initial(cfg.initial, &cfg);
        Ok(Self {
            u,
            f,
            cfg,
            state,
            values: Vec::new(),
            stats: IterStats::new(),
            monitor: None,
            residual_history: Vec::new(),
        })
    }

    /// Install a per-pass residual monitor, fired at the entry level.
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, T) + 'a,
    {
        self.monitor = Some(Box::new(f));
        self
    }

    /// Fixed point iteration on a time slab. Returns `true` iff every group
    /// (and transitively every element) converges within the budget.
    pub fn iterate_slab(&mut self, slab: &mut TimeSlab<T>) -> bool {
        self.begin();
        let ok = self.slab_loop(slab);
        self.stats.converged = ok;
        ok
    }

    /// Fixed point iteration on an element group.
    pub fn iterate_group(&mut self, group: &mut ElementGroup<T>) -> bool {
        self.begin();
        let ok = self.group_loop(group, true);
        self.stats.converged = ok;
        ok
    }

    /// Fixed point iteration on a single element.
    pub fn iterate_element(&mut self, element: &mut Element<T>) -> bool {
        self.begin();
        let ok = self.element_loop(element, true);
        self.stats.converged = ok;
        ok
    }

    /// L2 norm of the group residuals over the slab.
    pub fn residual_slab(&mut self, slab: &TimeSlab<T>) -> T {
        self.sync_slab(slab);
        self.slab_residual(slab)
    }

    /// L2 norm of the element residuals in the group.
    pub fn residual_group(&mut self, group: &ElementGroup<T>) -> T {
        self.sync_group(group);
        self.group_residual(group)
    }

    /// Absolute value of the element's fixed point defect.
    pub fn residual_element(&mut self, element: &Element<T>) -> T {
        self.sync_element(element);
        self.element_residual(element)
    }

    /// Seed every element of the group from the previous slab's end values.
    pub fn init_group(&mut self, group: &mut ElementGroup<T>) {
        for e in group.elements_mut() {
            let v0 = self.u.value(e.component());
            e.init(v0);
        }
        self.sync_group(group);
    }

    /// Seed one element from the previous slab's end value.
    pub fn init_element(&mut self, element: &mut Element<T>) {
        let v0 = self.u.value(element.component());
        element.init(v0);
        self.sync_element(element);
    }

    /// Restore every element of the group to its pre-iteration value.
    pub fn reset_group(&mut self, group: &mut ElementGroup<T>) {
        for e in group.elements_mut() {
            e.reset();
        }
        self.sync_group(group);
    }

    /// Restore one element to its pre-iteration value.
    pub fn reset_element(&mut self, element: &mut Element<T>) {
        element.reset();
        self.sync_element(element);
    }

    /// Log a diagnostic summary of the last `iterate_*` call.
    pub fn report(&self) {
        log::info!(
            "fixed point iteration {}: {} slab / {} group / {} element passes, \
             {} state changes, final residual {:?}, strategy {}",
            if self.stats.converged { "converged" } else { "did not converge" },
            self.stats.slab_passes,
            self.stats.group_passes,
            self.stats.element_passes,
            self.stats.state_changes,
            self.stats.final_residual,
            self.state.name(),
        );
    }

    /// Statistics of the last `iterate_*` call.
    pub fn stats(&self) -> &IterStats<T> {
        &self.stats
    }

    /// Entry-level residual after each pass of the last call.
    pub fn residual_history(&self) -> &[T] {
        &self.residual_history
    }

    /// Currently active strategy.
    pub fn strategy(&self) -> StrategyKind {
        self.state.kind()
    }

    // Reset per-call state: statistics, history, and the configured initial
    // strategy.
    fn begin(&mut self) {
        self.stats = IterStats::new();
        self.residual_history.clear();
        self.state = Strategy::initial(self.cfg.initial, &self.cfg);
    }

    fn slab_loop(&mut self, slab: &mut TimeSlab<T>) -> bool {
        self.sync_slab(slab);
        let mut r = self.state.start();
        while r.n < self.cfg.maxiter {
            if !self.update_slab(slab) {
                return false;
            }
            self.stats.slab_passes += 1;
            r.push(self.slab_residual(slab));
            self.observe(&r);
            if self.state.converged(Level::TimeSlab, &r, &self.cfg) {
                return true;
            }
            if let Some(kind) = self.state.diverged(Level::TimeSlab, &mut r, &self.cfg) {
                self.change_state(kind, &r);
                if self.state.resets_on_entry() {
                    self.reset_slab_values(slab);
                }
                if self.cfg.switch_policy == SwitchPolicy::Restart {
                    r = self.state.start();
                }
            }
            self.state.stabilize(&r, &self.cfg);
        }
        false
    }

    fn group_loop(&mut self, group: &mut ElementGroup<T>, top: bool) -> bool {
        self.sync_group(group);
        let mut r = self.state.start();
        while r.n < self.cfg.maxiter {
            if !self.update_group(group) {
                return false;
            }
            self.stats.group_passes += 1;
            r.push(self.group_residual(group));
            if top {
                self.observe(&r);
            }
            if self.state.converged(Level::ElementGroup, &r, &self.cfg) {
                return true;
            }
            if let Some(kind) = self.state.diverged(Level::ElementGroup, &mut r, &self.cfg) {
                self.change_state(kind, &r);
                if self.state.resets_on_entry() {
                    self.reset_group(group);
                }
                if self.cfg.switch_policy == SwitchPolicy::Restart {
                    r = self.state.start();
                }
            }
            self.state.stabilize(&r, &self.cfg);
        }
        false
    }

    fn element_loop(&mut self, element: &mut Element<T>, top: bool) -> bool {
        self.sync_element(element);
        let mut r = self.state.start();
        while r.n < self.cfg.maxiter {
            self.update_element(element);
            self.stats.element_passes += 1;
            r.push(self.element_residual(element));
            if top {
                self.observe(&r);
            }
            if self.state.converged(Level::Element, &r, &self.cfg) {
                return true;
            }
            if let Some(kind) = self.state.diverged(Level::Element, &mut r, &self.cfg) {
                self.change_state(kind, &r);
                if self.state.resets_on_entry() {
                    self.reset_element(element);
                }
                if self.cfg.switch_policy == SwitchPolicy::Restart {
                    r = self.state.start();
                }
            }
            self.state.stabilize(&r, &self.cfg);
        }
        false
    }

    // One slab pass: a full group-level iteration per group, in order.
    fn update_slab(&mut self, slab: &mut TimeSlab<T>) -> bool {
        for group in slab.groups_mut() {
            if !self.group_loop(group, false) {
                return false;
            }
        }
        true
    }

    // One group pass: a full element-level iteration per element. Ordering
    // follows the active strategy: sequential passes let later elements
    // observe already-updated siblings; independent passes solve every
    // element against a frozen snapshot and commit afterwards.
    fn update_group(&mut self, group: &mut ElementGroup<T>) -> bool {
        match self.state.update().mode {
            Mode::Sequential => {
                for e in group.elements_mut() {
                    if !self.element_loop(e, false) {
                        return false;
                    }
                }
                true
            }
            Mode::Independent => {
                let frozen = self.values.clone();
                let mut next: Vec<(usize, T)> = Vec::with_capacity(group.len());
                for e in group.elements_mut() {
                    self.values.copy_from_slice(&frozen);
                    if !self.element_loop(e, false) {
                        return false;
                    }
                    next.push((e.component(), e.value()));
                }
                for (c, v) in next {
                    self.values[c] = v;
                }
                true
            }
        }
    }

    // One element pass: `lits` damped sweeps of the fixed point map.
    fn update_element(&mut self, element: &mut Element<T>) {
        let policy = self.state.update();
        let t = element.endtime();
        let c = element.component();
        for _ in 0..self.cfg.lits {
            let v = self.values[c];
            let target = self.f.eval(&self.values, t, c);
            self.values[c] = policy.theta * target + (T::one() - policy.theta) * v;
        }
        element.set_value(self.values[c]);
    }

    fn element_residual(&self, element: &Element<T>) -> T {
        let c = element.component();
        (self.f.eval(&self.values, element.endtime(), c) - self.values[c]).abs()
    }

    #[cfg(feature = "rayon")]
    fn group_residual(&self, group: &ElementGroup<T>) -> T {
        let f = self.f;
        let values = &self.values;
        group
            .elements()
            .par_iter()
            .map(|e| {
                let c = e.component();
                let d = f.eval(values, e.endtime(), c) - values[c];
                d * d
            })
            .reduce(T::zero, |a, b| a + b)
            .sqrt()
    }

    #[cfg(not(feature = "rayon"))]
    fn group_residual(&self, group: &ElementGroup<T>) -> T {
        group
            .elements()
            .iter()
            .fold(T::zero(), |acc, e| {
                let c = e.component();
                let d = self.f.eval(&self.values, e.endtime(), c) - self.values[c];
                acc + d * d
            })
            .sqrt()
    }

    fn slab_residual(&self, slab: &TimeSlab<T>) -> T {
        slab.groups()
            .iter()
            .fold(T::zero(), |acc, g| {
                let r = self.group_residual(g);
                acc + r * r
            })
            .sqrt()
    }

    // Global strategy switch: effective immediately for every level still
    // in flight in the current call.
    fn change_state(&mut self, kind: StrategyKind, r: &Residuals<T>) {
        let next = Strategy::enter(kind, r, &self.cfg);
        log::debug!(
            "switching iteration strategy: {} -> {} (rate {:?})",
            self.state.name(),
            next.name(),
            r.rate(),
        );
        self.state = next;
        self.stats.state_changes += 1;
    }

    fn reset_slab_values(&mut self, slab: &mut TimeSlab<T>) {
        for group in slab.groups_mut() {
            self.reset_group(group);
        }
    }

    fn observe(&mut self, r: &Residuals<T>) {
        self.stats.final_residual = r.r_curr;
        self.residual_history.push(r.r_curr);
        if let Some(monitor) = self.monitor.as_mut() {
            monitor(r.n, r.r_curr);
        }
    }

    fn ensure_values(&mut self, max_component: usize) {
        // Cover the configured extent as well, so an evaluator coupling to
        // components outside the synced node reads zero instead of panicking.
        let len = (max_component + 1).max(self.cfg.components);
        if self.values.len() < len {
            self.values.resize(len, T::zero());
        }
    }

    fn sync_element(&mut self, element: &Element<T>) {
        self.ensure_values(element.component());
        self.values[element.component()] = element.value();
    }

    fn sync_group(&mut self, group: &ElementGroup<T>) {
        if let Some(max) = group.max_component() {
            self.ensure_values(max);
        }
        for e in group.elements() {
            self.values[e.component()] = e.value();
        }
    }

    fn sync_slab(&mut self, slab: &TimeSlab<T>) {
        if let Some(max) = slab.max_component() {
            self.ensure_values(max);
        }
        for g in slab.groups() {
            for e in g.elements() {
                self.values[e.component()] = e.value();
            }
        }
    }
}
