// ABOUTME: Runner - builds grids and agents for a strategy, runs them to completion.
// ABOUTME: For message-passing it also starts and drains the coordinator tasks.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use super::report::RunReport;
use super::strategy::Strategy;
use crate::agent::{Agent, AgentId, AgentResult, Battlefield};
use crate::config::SiegeConfig;
use crate::coordination::{COORDINATION_CAPACITY, Coordinators, channels};
use crate::error::SiegeError;
use crate::grid::{Grid, MirroredGrids};
use crate::observe::{NoopObserver, SharedObserver, SiegeEvent};
use crate::sequence::AttackPlan;

/// Runs strategies against a fixed attack plan.
pub struct Runner {
    config: SiegeConfig,
    observer: SharedObserver,
}

impl Runner {
    /// Create a runner that discards events.
    pub fn new(config: SiegeConfig) -> Self {
        Self {
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replace the observer.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &SiegeConfig {
        &self.config
    }

    /// Run every strategy the configured selector names, in order.
    pub async fn run_selection(&self, plan: &AttackPlan) -> Result<Vec<RunReport>, SiegeError> {
        let mut reports = Vec::new();
        for strategy in self.config.strategy.strategies() {
            reports.push(self.run(strategy, plan).await?);
        }
        Ok(reports)
    }

    /// Run one strategy to completion on fresh grids.
    ///
    /// The plan is checked against the grid before any task starts, so a bad
    /// sequence never produces a partial run.
    pub async fn run(
        &self,
        strategy: Strategy,
        plan: &AttackPlan,
    ) -> Result<RunReport, SiegeError> {
        self.config.validate()?;
        plan.check_bounds(self.config.grid_width, self.config.grid_height)?;

        self.observer.emit(SiegeEvent::RunStarted { strategy });

        let report = match strategy {
            Strategy::ExclusiveLock | Strategy::TokenLock => {
                self.run_shared(strategy, plan).await?
            }
            Strategy::MessagePassing => self.run_mirrored(plan).await?,
        };

        self.observer.emit(SiegeEvent::RunFinished {
            strategy,
            elapsed: report.elapsed,
        });
        Ok(report)
    }

    async fn run_shared(
        &self,
        strategy: Strategy,
        plan: &AttackPlan,
    ) -> Result<RunReport, SiegeError> {
        let grid = Arc::new(Grid::new(
            self.config.grid_width,
            self.config.grid_height,
            self.config.latency(),
            strategy.guard_kind(),
        ));

        let started = Instant::now();
        let handles = AgentId::ALL.map(|id| {
            self.spawn_agent(id, plan, Battlefield::Shared(grid.clone()))
        });
        let agents = join_agents(handles).await?;
        let elapsed = started.elapsed();

        Ok(RunReport {
            strategy,
            elapsed,
            grids: vec![grid.snapshot()],
            agents,
            coordination: None,
        })
    }

    async fn run_mirrored(&self, plan: &AttackPlan) -> Result<RunReport, SiegeError> {
        let grids = Arc::new(MirroredGrids::new(
            self.config.grid_width,
            self.config.grid_height,
            self.config.latency(),
        ));

        let (mailbox, inbox) = channels(COORDINATION_CAPACITY);
        let coordinators = Coordinators::spawn(inbox, grids.clone(), self.observer.clone());

        let started = Instant::now();
        let handles = AgentId::ALL.map(|id| {
            self.spawn_agent(
                id,
                plan,
                Battlefield::Mirrored {
                    grids: grids.clone(),
                    mailbox: mailbox.clone(),
                },
            )
        });
        // Agents now own every sender; the channels close when both finish.
        drop(mailbox);

        let agents = join_agents(handles).await;
        let elapsed = started.elapsed();

        // A coordinator fault usually explains the agent failure, so report it first.
        let coordination = coordinators.join().await?;
        let agents = agents?;

        Ok(RunReport {
            strategy: Strategy::MessagePassing,
            elapsed,
            grids: grids.snapshots().to_vec(),
            agents,
            coordination: Some(coordination),
        })
    }

    fn spawn_agent(
        &self,
        id: AgentId,
        plan: &AttackPlan,
        battlefield: Battlefield,
    ) -> JoinHandle<Result<AgentResult, SiegeError>> {
        let agent = Agent::new(id, self.config.agent_power, plan.sequence(id).to_vec());
        let observer = self.observer.clone();
        tokio::spawn(agent.run(battlefield, observer))
    }
}

/// Wait for both agents, reporting the first failure in agent order.
async fn join_agents(
    handles: [JoinHandle<Result<AgentResult, SiegeError>>; 2],
) -> Result<Vec<AgentResult>, SiegeError> {
    let results = futures::future::join_all(handles).await;

    let mut agents = Vec::with_capacity(results.len());
    for result in results {
        agents.push(result??);
    }
    Ok(agents)
}
