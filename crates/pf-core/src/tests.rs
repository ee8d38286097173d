//! Unit tests for pf-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, AgentKindId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(AgentKindId::INVALID.0, u16::MAX);
        assert_eq!(AgentId::default(), AgentId::INVALID);
    }

    #[test]
    fn display_is_short() {
        assert_eq!(AgentId(7).to_string(), "pax#7");
        assert_eq!(AgentKindId(1).to_string(), "kind#1");
        assert_eq!(AgentId::INVALID.to_string(), "pax#-");
        assert!(!AgentId::default().is_valid());
    }
}

#[cfg(test)]
mod stage {
    use crate::StageKind;

    #[test]
    fn labels_parse_back() {
        for kind in StageKind::ALL {
            assert_eq!(kind.as_str().parse::<StageKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_label_is_config_error() {
        assert!("lounge".parse::<StageKind>().is_err());
    }
}

#[cfg(test)]
mod geo {
    use crate::Point3;

    #[test]
    fn arithmetic() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Point3::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Point3::new(0.5, 1.5, 2.5));
        assert_eq!(b * 4.0, Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn normalized_rejects_zero() {
        assert!(Point3::ORIGIN.normalized().is_none());
        let n = Point3::new(0.0, 3.0, 4.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15).since(Tick(10)), 5);
        assert_eq!(Tick(3).since(Tick(5)), 0);
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = SimClock::new(250);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_ms(), 500);
        assert!((clock.elapsed_secs() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ticks_for_secs_rounds_up() {
        let clock = SimClock::new(100);
        assert_eq!(clock.ticks_for_secs(5.0).unwrap(), 50);
        assert_eq!(clock.ticks_for_secs(0.25).unwrap(), 3);
        // Never less than one tick.
        assert_eq!(clock.ticks_for_secs(0.001).unwrap(), 1);
    }

    #[test]
    fn ticks_for_secs_rejects_bad_intervals() {
        let clock = SimClock::new(100);
        assert!(clock.ticks_for_secs(0.0).is_err());
        assert!(clock.ticks_for_secs(-1.0).is_err());
        assert!(clock.ticks_for_secs(f64::NAN).is_err());
    }

    #[test]
    fn sim_config_end_tick_and_validate() {
        let cfg = SimConfig {
            tick_duration_ms:      100,
            total_ticks:           600,
            seed:                  42,
            output_interval_ticks: 10,
        };
        assert_eq!(cfg.end_tick(), Tick(600));
        assert!(cfg.validate().is_ok());
        assert!(SimConfig { tick_duration_ms: 0, ..cfg }.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::error::check_probability;
    use crate::{AgentId, AgentRng, ScriptedRolls, SimRng, UnitRoll};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            assert_eq!(r1.roll(), r2.roll());
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        assert_ne!(r0.roll(), r1.roll(), "seeds for adjacent agents should diverge");
    }

    #[test]
    fn rolls_in_unit_interval() {
        let mut rng = AgentRng::new(0, AgentId(0));
        for _ in 0..1000 {
            let v = rng.roll();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn pick_stays_in_range() {
        let mut rng = SimRng::new(9);
        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[rng.pick(3)] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn scripted_rolls_replay_then_fall_back() {
        let mut rolls = ScriptedRolls::new([0.9, 0.1]).with_fallback(0.5);
        assert_eq!(rolls.remaining(), 2);
        assert_eq!(rolls.roll(), 0.9);
        assert_eq!(rolls.roll(), 0.1);
        assert_eq!(rolls.roll(), 0.5);
        assert_eq!(rolls.roll(), 0.5);
    }

    #[test]
    fn probability_bounds() {
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", 0.3).is_ok());
        assert!(check_probability("p", 0.0).is_err());
        assert!(check_probability("p", 1.01).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }
}

#[cfg(test)]
mod event {
    use crate::{AgentId, EventBuffer, EventKind, StageKind};

    #[test]
    fn buffer_drains_in_order() {
        let mut buf = EventBuffer::new();
        buf.push(AgentId(1), EventKind::Processing { stage: StageKind::CheckIn });
        buf.push(AgentId(2), EventKind::DoneAll);
        let drained: Vec<_> = buf.drain().map(|e| e.agent).collect();
        assert_eq!(drained, vec![AgentId(1), AgentId(2)]);
        assert!(buf.is_empty());
    }

    #[test]
    fn labels_and_stage() {
        let e = EventKind::Attempt { stage: StageKind::Security, roll: 0.2, chance: 0.3, success: true };
        assert_eq!(e.as_str(), "attempt");
        assert_eq!(e.stage(), Some(StageKind::Security));
        assert_eq!(EventKind::DoneAll.stage(), None);
    }
}
