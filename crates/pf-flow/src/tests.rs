//! Unit tests for pf-flow.

use std::cell::RefCell;
use std::rc::Rc;

use pf_agent::{AgentPool, AgentPoolBuilder, AgentState, ServiceProfile};
use pf_core::{AgentId, AgentKindId, EventBuffer, EventKind, Point3, StageKind, Tick};
use pf_stage::{QueueLayout, Stage};

use crate::{FlowError, FlowGraph, Handoff, StageCompletion};

use StageKind::{BagDrop, Boarding, CheckIn, Passport, Security};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn pool(n: usize) -> AgentPool {
    AgentPoolBuilder::new(11, CheckIn)
        .kind("standard", ServiceProfile::new(1, 1.0, 0.0).unwrap(), n)
        .build()
        .unwrap()
}

fn stage_at(kind: StageKind, capacity: usize, entry_z: f32) -> Stage {
    let layout = QueueLayout { entry_point: Point3::new(0.0, 0.0, entry_z), ..QueueLayout::default() };
    Stage::new(kind, capacity, layout).unwrap()
}

/// A registered chain over `order`, every stage with capacity `cap`.
fn chain(order: &[StageKind], cap: usize) -> FlowGraph {
    let mut g = FlowGraph::from_order(order).unwrap();
    for (i, &k) in order.iter().enumerate() {
        g.register(stage_at(k, cap, i as f32 * 10.0)).unwrap();
    }
    g
}

/// Acquire an agent and route it into the head stage.
fn spawn(g: &mut FlowGraph, p: &mut AgentPool, ev: &mut EventBuffer) -> AgentId {
    let id = p.acquire(AgentKindId(0)).unwrap();
    p.agents[id.index()].reset(g.head());
    g.enter(id, p, ev).unwrap();
    id
}

/// Mark every agent currently in service at `kind` as done.
fn finish_active(g: &mut FlowGraph, kind: StageKind, p: &mut AgentPool) {
    let s = g.stage_instance(kind).unwrap();
    for id in s.active().to_vec() {
        assert!(s.mark_done(&mut p.agents[id.index()]));
    }
}

// ── Topology ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod topology {
    use super::*;

    #[test]
    fn order_links_consecutive_stages() {
        let g = FlowGraph::from_order(&[CheckIn, Security, Boarding]).unwrap();
        assert_eq!(g.head(), CheckIn);
        assert_eq!(g.terminal(), Boarding);
        assert_eq!(g.next(CheckIn), Some(Security));
        assert_eq!(g.next(Security), Some(Boarding));
        assert_eq!(g.next(Boarding), None);
        assert_eq!(g.next(Passport), None, "unlinked stage");
    }

    #[test]
    fn empty_order_rejected() {
        assert_eq!(FlowGraph::from_order(&[]).err(), Some(FlowError::EmptyOrder));
    }

    #[test]
    fn repeated_stage_is_a_cycle() {
        let err = FlowGraph::from_order(&[CheckIn, Security, CheckIn]).err();
        assert_eq!(err, Some(FlowError::Cycle { stage: CheckIn }));
    }

    #[test]
    fn links_in_any_order() {
        let g = FlowGraph::from_links([
            (Security, Some(Boarding)),
            (Boarding, None),
            (CheckIn, Some(Security)),
        ])
        .unwrap();
        assert_eq!(g.order(), &[CheckIn, Security, Boarding]);
    }

    #[test]
    fn implicit_terminal() {
        let g = FlowGraph::from_links([(CheckIn, Some(BagDrop))]).unwrap();
        assert_eq!(g.order(), &[CheckIn, BagDrop]);
        assert_eq!(g.next(BagDrop), None);
    }

    #[test]
    fn two_heads_rejected() {
        let err = FlowGraph::from_links([(CheckIn, Some(Boarding)), (BagDrop, Some(Boarding))]).err();
        assert_eq!(err, Some(FlowError::MultipleHeads { heads: vec![CheckIn, BagDrop] }));
    }

    #[test]
    fn closed_loop_rejected() {
        let err = FlowGraph::from_links([(CheckIn, Some(Security)), (Security, Some(CheckIn))]).err();
        assert_eq!(err, Some(FlowError::Cycle { stage: CheckIn }));
    }

    #[test]
    fn detached_loop_rejected() {
        let err = FlowGraph::from_links([
            (CheckIn, Some(Boarding)),
            (Security, Some(Passport)),
            (Passport, Some(Security)),
        ])
        .err();
        assert_eq!(err, Some(FlowError::Cycle { stage: Security }));
    }

    #[test]
    fn self_link_and_duplicate_link_rejected() {
        assert_eq!(
            FlowGraph::from_links([(CheckIn, Some(CheckIn))]).err(),
            Some(FlowError::Cycle { stage: CheckIn }),
        );
        assert_eq!(
            FlowGraph::from_links([(CheckIn, Some(Security)), (CheckIn, Some(Boarding))]).err(),
            Some(FlowError::DuplicateLink { stage: CheckIn }),
        );
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use super::*;

    #[test]
    fn register_checks_graph_membership() {
        let mut g = FlowGraph::from_order(&[CheckIn, Boarding]).unwrap();
        let err = g.register(stage_at(Security, 1, 0.0)).err();
        assert_eq!(err, Some(FlowError::NotInGraph { stage: Security }));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut g = chain(&[CheckIn, Boarding], 1);
        let err = g.register(stage_at(CheckIn, 2, 0.0)).err();
        assert_eq!(err, Some(FlowError::DuplicateStage { stage: CheckIn }));
        assert_eq!(g.stage_instance(CheckIn).unwrap().capacity(), 1, "first registration kept");
    }

    #[test]
    fn validate_reports_first_missing_stage() {
        let mut g = FlowGraph::from_order(&[CheckIn, Security, Boarding]).unwrap();
        g.register(stage_at(CheckIn, 1, 0.0)).unwrap();
        assert_eq!(g.validate_registry().err(), Some(FlowError::Unregistered { stage: Security }));
        g.register(stage_at(Security, 1, 0.0)).unwrap();
        g.register(stage_at(Boarding, 1, 0.0)).unwrap();
        assert!(g.validate_registry().is_ok());
    }

    #[test]
    fn deregister_then_register_again() {
        let mut g = chain(&[CheckIn, Boarding], 1);
        assert!(g.deregister(Boarding).is_some());
        assert!(g.deregister(Boarding).is_none());
        assert!(g.stage_instance(Boarding).is_none());
        g.register(stage_at(Boarding, 3, 0.0)).unwrap();
        assert_eq!(g.stages().map(Stage::kind).collect::<Vec<_>>(), vec![CheckIn, Boarding]);
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use super::*;

    #[test]
    fn enter_queues_at_head_entry_point() {
        let mut g = chain(&[CheckIn, Boarding], 1);
        let mut p = pool(1);
        let mut ev = EventBuffer::new();
        let id = spawn(&mut g, &mut p, &mut ev);

        let a = &p.agents[id.index()];
        assert_eq!(a.state(), AgentState::InQueue);
        assert_eq!(a.current_stage(), CheckIn);
        assert_eq!(g.stage_instance(CheckIn).unwrap().queue_len(), 1);
        assert_eq!(ev.iter().next().map(|e| e.kind.clone()), Some(EventKind::Moving {
            stage:    CheckIn,
            position: Point3::ORIGIN,
        }));
    }

    #[test]
    fn finished_agent_moves_to_successor_queue() {
        let mut g = chain(&[CheckIn, Boarding], 1);
        let mut p = pool(1);
        let mut ev = EventBuffer::new();
        let id = spawn(&mut g, &mut p, &mut ev);
        g.admit_all(&mut p, &mut ev);
        finish_active(&mut g, CheckIn, &mut p);

        let mut cursor = 0;
        let taken = g.stage_instance_mut(CheckIn).unwrap().take_completed(&p.agents, &mut cursor);
        assert_eq!(taken, Some(id));
        assert_eq!(g.on_agent_finished(id, &mut p, &mut ev), Ok(Handoff::Routed(Boarding)));

        let a = &p.agents[id.index()];
        assert_eq!(a.current_stage(), Boarding);
        assert_eq!(a.state(), AgentState::InQueue);
        // Slot 0 of the default layout.
        assert_eq!(a.position(), Point3::ORIGIN);
        assert!(g.stage_instance(Boarding).unwrap().contains(id));
    }

    #[test]
    fn terminal_stage_reclaims_agent() {
        let mut g = chain(&[Boarding], 1);
        let mut p = pool(1);
        let mut ev = EventBuffer::new();
        let id = spawn(&mut g, &mut p, &mut ev);
        g.admit_all(&mut p, &mut ev);
        finish_active(&mut g, Boarding, &mut p);
        ev.clear();

        let report = g.sweep(Boarding, Tick(4), &mut p, &mut ev);
        assert_eq!(report.finished, 1);
        assert_eq!(p.agents[id.index()].state(), AgentState::DoneAll);
        assert!(!p.agents[id.index()].is_active());
        assert_eq!(p.inactive_count(AgentKindId(0)), 1);
        let kinds: Vec<&str> = ev.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["stage_completed", "done_all", "reclaimed"]);
    }

    #[test]
    fn missing_successor_drops_agent() {
        let mut g = chain(&[CheckIn, Security, Boarding], 1);
        g.deregister(Security);
        let mut p = pool(1);
        let mut ev = EventBuffer::new();
        let id = spawn(&mut g, &mut p, &mut ev);
        g.admit_all(&mut p, &mut ev);
        finish_active(&mut g, CheckIn, &mut p);

        let report = g.sweep(CheckIn, Tick(2), &mut p, &mut ev);
        assert_eq!(report.unroutable, vec![FlowError::Unroutable { agent: id, stage: Security }]);
        assert!(!p.agents[id.index()].is_active());
        assert!(ev.iter().any(|e| e.kind == EventKind::Dropped { stage: Security }));
        assert!(g.stages().all(Stage::is_idle));
    }
}

// ── Sweep ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sweep {
    use super::*;

    #[test]
    fn sweep_routes_then_backfills() {
        let mut g = chain(&[CheckIn, Boarding], 1);
        let mut p = pool(3);
        let mut ev = EventBuffer::new();
        let ids: Vec<_> = (0..3).map(|_| spawn(&mut g, &mut p, &mut ev)).collect();
        g.admit_all(&mut p, &mut ev);
        finish_active(&mut g, CheckIn, &mut p);

        let report = g.sweep(CheckIn, Tick(1), &mut p, &mut ev);
        assert_eq!((report.completed, report.routed, report.backfilled), (1, 1, 1));

        let check_in = g.stage_instance(CheckIn).unwrap();
        assert_eq!(check_in.active(), &[ids[1]]);
        assert_eq!(check_in.queued().collect::<Vec<_>>(), vec![ids[2]]);
        assert_eq!(p.agents[ids[2].index()].queue_place(), Some(0));
        assert_eq!(g.stage_instance(Boarding).unwrap().queued().collect::<Vec<_>>(), vec![ids[0]]);
    }

    #[test]
    fn listeners_fire_once_per_completion() {
        let seen: Rc<RefCell<Vec<StageCompletion>>> = Rc::default();
        let mut g = chain(&[CheckIn, Boarding], 2);
        let sink = Rc::clone(&seen);
        g.subscribe(move |c: &StageCompletion| sink.borrow_mut().push(*c));
        assert_eq!(g.listener_count(), 1);

        let mut p = pool(2);
        let mut ev = EventBuffer::new();
        let ids: Vec<_> = (0..2).map(|_| spawn(&mut g, &mut p, &mut ev)).collect();
        g.admit_all(&mut p, &mut ev);
        finish_active(&mut g, CheckIn, &mut p);

        g.sweep_all(Tick(3), &mut p, &mut ev);
        // A second sweep finds nothing new.
        g.sweep_all(Tick(4), &mut p, &mut ev);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.iter().map(|c| c.agent).collect::<Vec<_>>(), ids);
        assert!(seen.iter().all(|c| c.stage == CheckIn && c.next == Some(Boarding) && c.tick == Tick(3)));
    }

    #[test]
    fn unregistered_stage_sweeps_nothing() {
        let mut g = FlowGraph::from_order(&[CheckIn]).unwrap();
        let mut p = pool(1);
        let mut ev = EventBuffer::new();
        assert_eq!(g.sweep(CheckIn, Tick(0), &mut p, &mut ev), Default::default());
        assert!(ev.is_empty());
    }
}
