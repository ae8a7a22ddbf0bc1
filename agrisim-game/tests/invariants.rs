use agrisim_game::{
    Action, DayOutcome, FarmSession, FarmState, RainfallLabel, SimConfig, SimError,
    WeatherConfig, apply_action,
};
use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_series(rng: &mut SmallRng, len: usize) -> Vec<agrisim_game::DailyWeather> {
    let start = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
    (0..len)
        .map(|idx| agrisim_game::DailyWeather {
            day: u32::try_from(idx + 1).unwrap(),
            date: start + chrono::Days::new(idx as u64),
            precipitation_mm: 0.0,
            t_min_c: None,
            t_max_c: None,
            rainfall: RainfallLabel::ALL[rng.gen_range(0..RainfallLabel::ALL.len())],
            et0_mm: 0.0,
            soil_water_mm: rng.gen_range(0.0..=100.0),
        })
        .collect()
}

#[test]
fn state_stays_in_bounds_across_seed_sweep() {
    let cfg = SimConfig::default_config();
    let weather_cfg = WeatherConfig::default_config();
    for seed in 0..200_u64 {
        let mut rng = SmallRng::seed_from_u64(seed ^ 0x5EED);
        let len = rng.gen_range(1..=20);
        let mut session =
            FarmSession::new(cfg.clone(), &weather_cfg, random_series(&mut rng, len), seed);
        assert!(session.state().is_within_bounds(cfg.price_band));

        loop {
            for _ in 0..rng.gen_range(0..=3) {
                let action = Action::ALL[rng.gen_range(0..Action::ALL.len())];
                session.apply_action(action).unwrap();
                assert!(
                    session.state().is_within_bounds(cfg.price_band),
                    "seed {seed}: out of bounds after {action}: {:?}",
                    session.state()
                );
            }
            match session.advance_day().unwrap() {
                DayOutcome::NextDay { .. } => {
                    assert!(session.state().is_within_bounds(cfg.price_band));
                    assert!(session.state().actions_taken_today.is_empty());
                }
                DayOutcome::SeasonComplete(_) => break,
            }
        }
    }
}

#[test]
fn season_completes_after_exactly_series_length_advances() {
    let cfg = SimConfig::default_config();
    let weather_cfg = WeatherConfig::default_config();
    for len in 1..=15_usize {
        let mut rng = SmallRng::seed_from_u64(len as u64);
        let mut session =
            FarmSession::new(cfg.clone(), &weather_cfg, random_series(&mut rng, len), 9);
        for advance in 1..=len {
            let outcome = session.advance_day().unwrap();
            let complete = matches!(outcome, DayOutcome::SeasonComplete(_));
            assert_eq!(complete, advance == len, "len {len}, advance {advance}");
        }

        let frozen = session.state().clone();
        for action in Action::ALL {
            assert!(matches!(
                session.apply_action(action),
                Err(SimError::InvalidTransition { .. })
            ));
        }
        assert!(session.advance_day().is_err());
        assert_eq!(session.state(), &frozen);
    }
}

#[test]
fn crop_health_is_never_assigned_directly() {
    let cfg = SimConfig::default_config();
    let weather_cfg = WeatherConfig::default_config();
    let mut rng = SmallRng::seed_from_u64(77);
    let mut session = FarmSession::new(cfg, &weather_cfg, random_series(&mut rng, 10), 77);
    while !session.phase().is_complete() {
        session.apply_action(Action::Scout).unwrap();
        let state = session.state();
        let expected =
            agrisim_game::crop_health(state.soil_moisture, state.nitrogen, state.pest_pressure);
        assert!((state.crop_health() - expected).abs() < 1e-12);
        session.advance_day().unwrap();
    }
}

#[test]
fn scouting_low_pest_pressure_clamps_before_growth() {
    let cfg = SimConfig::default_config();
    for pest in 0..5_u32 {
        let mut start = FarmState::opening(&cfg, 55.0);
        start.pest_pressure = f64::from(pest);
        for seed in 0..100_u64 {
            for rain in RainfallLabel::ALL {
                let mut rng = SmallRng::seed_from_u64(seed);
                let out = apply_action(&start, Action::Scout, rain, &cfg, &mut rng);
                let expected = out.pest_growth.min(100.0);
                assert!(
                    (out.state.pest_pressure - expected).abs() < 1e-9,
                    "pest {pest} seed {seed} {rain}: got {} expected {expected}",
                    out.state.pest_pressure
                );
            }
        }
    }
}
