use super::*;
use approx::assert_relative_eq;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

/// Default tuning without any automatic fire, so scenarios only see the
/// shots they place themselves
fn quiet_params() -> Params {
    let mut params = Params::default();
    params.player.auto_fire_shots_per_second = 0.0;
    params.enemy_fire.interval = 0.0;
    params.boss.shoot_interval = 0.0;
    params
}

fn world_with(params: Params) -> World {
    World::new(Rc::new(params), StdRng::seed_from_u64(5))
}

fn run_until(world: &mut World, phase: Phase) {
    for _ in 0..3000 {
        if world.phase() == phase {
            return;
        }
        world.tick(DT);
    }
    panic!("never reached {}, stuck in {}", phase, world.phase());
}

/// Parks a motionless projectile centred on `center`
fn shoot_at(world: &mut World, kind: EntityKind, center: Point) {
    let id = world.ids.next_id();
    let rect = Rect::from_center(center, Size::new(6.0, 12.0));
    world
        .bullets
        .push(Bullet::new(id, kind, rect, Point::default()));
}

fn count(events: &[FrameEvent], event: FrameEvent) -> usize {
    events.iter().filter(|candidate| **candidate == event).count()
}

fn enemy_ys(world: &World) -> Vec<f32> {
    world
        .wave()
        .enemies()
        .map(|enemy| enemy.position.y)
        .collect()
}

#[test]
fn layout_matches_the_default_screen() {
    let layout = Layout::new(&Params::default());
    assert_eq!(layout.spawn, Point::new(187.5, 607.0));
    assert_eq!(layout.boss_size, Size::new(96.0, 96.0));
    assert_relative_eq!(layout.enemy_scale, 0.75);
    assert_relative_eq!(layout.move_max.y, 641.0);
}

#[test]
fn intro_hands_over_to_the_wave() {
    let mut world = world_with(quiet_params());
    assert_eq!(world.phase(), Phase::Intro);
    assert!(world.player().position().y > world.layout().height);

    run_until(&mut world, Phase::Phase1Intro);
    assert!(world.intro_boss().is_none());
    assert_eq!(world.wave().live_count(), 32);
    assert_eq!(world.player().position(), world.layout().spawn);

    run_until(&mut world, Phase::Phase1);
    let events = world.drain_events();
    assert_eq!(count(&events, FrameEvent::PhaseChanged(Phase::Phase1Intro)), 1);
    assert_eq!(count(&events, FrameEvent::PhaseChanged(Phase::Phase1)), 1);
}

#[test]
fn pointer_is_ignored_during_the_intro() {
    let mut world = world_with(quiet_params());
    world.aim(Point::new(0.0, 0.0));
    for _ in 0..30 {
        world.tick(DT);
    }
    assert_relative_eq!(world.player().position().x, world.layout().spawn.x);
}

#[test]
fn combat_phases_fire_automatically() {
    let mut world = world_with(Params::default());
    run_until(&mut world, Phase::Phase1);
    world.drain_events();
    for _ in 0..90 {
        world.tick(DT);
    }
    // two shots per second, the cadence may carry a partial interval over
    // from the intro
    let shots = count(&world.drain_events(), FrameEvent::Sound(Sfx::ShipFire));
    assert!((2..=3).contains(&shots), "{} shots", shots);
}

#[test]
fn nothing_fires_outside_combat() {
    let mut world = world_with(Params::default());
    for _ in 0..60 {
        world.tick(DT);
    }
    assert_eq!(world.phase(), Phase::Intro);
    assert!(world.bullets().is_empty());
    assert!(world.drain_events().is_empty());
}

#[test]
fn non_lethal_hit_costs_one_life_and_freezes_the_ship() {
    let mut world = world_with(quiet_params());
    run_until(&mut world, Phase::Phase1);
    world.drain_events();

    let center = world.player().position();
    shoot_at(&mut world, EntityKind::EnemyBullet, center);
    world.tick(DT);
    assert_eq!(world.player().lives(), 4);
    assert_eq!(world.phase(), Phase::Phase1);
    assert_eq!(world.player().ship().state_name(), "damage");
    assert!(world.bullets().is_empty());
    assert_relative_eq!(world.player_bar().ratio(), 0.8);
    assert_eq!(count(&world.drain_events(), FrameEvent::Sound(Sfx::ShipDamage)), 1);

    world.aim(Point::new(0.0, 0.0));
    world.tick(DT);
    assert_eq!(world.player().position(), center);

    // recovery is max(0.5 s, 4 frames at 12 fps)
    for _ in 0..35 {
        world.tick(DT);
    }
    assert_eq!(world.player().ship().state_name(), "idle");
    world.aim(Point::new(0.0, 0.0));
    world.tick(DT);
    assert!(world.player().position().x < center.x);
}

#[test]
fn last_life_ends_the_run_exactly_once() {
    let mut world = world_with(quiet_params());
    run_until(&mut world, Phase::Phase1);
    world.drain_events();

    let mut events = Vec::new();
    for _ in 0..8 {
        let center = world.player().position();
        shoot_at(&mut world, EntityKind::EnemyBullet, center);
        world.tick(DT);
        events.extend(world.drain_events());
    }
    assert_eq!(world.player().lives(), 0);
    assert_eq!(world.phase(), Phase::GameOver);
    assert_eq!(count(&events, FrameEvent::PhaseChanged(Phase::GameOver)), 1);
    assert_eq!(count(&events, FrameEvent::StopMusic), 1);
    assert_eq!(count(&events, FrameEvent::Sound(Sfx::ShipDeath)), 1);
    assert_eq!(world.player().ship().state_name(), "death");
    assert!(world.player_bar().is_hidden());

    // the banner waits for the death clip, restart input with it
    assert_eq!(world.banner(), None);
    assert!(!world.accepts_restart());
    for _ in 0..30 {
        world.tick(DT);
    }
    assert_eq!(world.banner(), Some(Banner::GameOver));
    assert!(world.is_over());
    assert!(world.accepts_restart());
}

#[test]
fn invaders_reaching_the_ship_are_lethal() {
    let mut params = quiet_params();
    params.enemy.rows = 1;
    // formation bottom at 594, ship top at 587
    params.enemy.start_y = 570.0;
    let mut world = world_with(params);
    run_until(&mut world, Phase::Phase1);
    world.tick(DT);
    assert_eq!(world.phase(), Phase::GameOver);
    assert_eq!(world.player().lives(), 0);
}

#[test]
fn edge_reversal_drops_the_wave_once() {
    let mut params = quiet_params();
    params.enemy.rows = 2;
    params.enemy.cols = 3;
    let drop = params.enemy.drop_distance;
    let mut world = world_with(params);
    run_until(&mut world, Phase::Phase1);

    let before = enemy_ys(&world);
    assert_eq!(before.len(), 6);
    let mut ticks = 0;
    while world.wave().direction() > 0.0 {
        world.tick(DT);
        ticks += 1;
        assert!(ticks < 2000, "wave never reached the right edge");
    }
    let right_edge = world
        .wave()
        .enemies()
        .map(|enemy| enemy.position.x + world.wave().size())
        .fold(f32::NEG_INFINITY, f32::max);
    assert!(right_edge >= world.layout().width - 20.0);

    // reversal only queues the drop
    assert_eq!(enemy_ys(&world), before);
    assert!(world.wave().has_pending_drop());

    world.tick(DT);
    let after = enemy_ys(&world);
    for (old, new) in before.iter().zip(after.iter()) {
        assert_relative_eq!(*new, old + drop);
    }
    assert!(!world.wave().has_pending_drop());

    for _ in 0..60 {
        world.tick(DT);
        assert_eq!(world.wave().direction(), -1.0);
        assert_eq!(enemy_ys(&world), after);
    }
}

#[test]
fn simultaneous_kills_clear_the_wave_once() {
    let mut params = quiet_params();
    params.enemy.rows = 1;
    params.enemy.cols = 2;
    let mut world = world_with(params);
    run_until(&mut world, Phase::Phase1);
    world.drain_events();

    let size = world.wave().size();
    let targets: Vec<Point> = world
        .wave()
        .enemies()
        .map(|enemy| enemy.rect(size).center())
        .collect();
    for target in targets {
        shoot_at(&mut world, EntityKind::PlayerBullet, target);
    }
    shoot_at(&mut world, EntityKind::EnemyBullet, Point::new(300.0, 300.0));
    world.tick(DT);

    let events = world.drain_events();
    assert_eq!(world.phase(), Phase::BossIntro);
    assert_eq!(count(&events, FrameEvent::PhaseChanged(Phase::BossIntro)), 1);
    assert_eq!(count(&events, FrameEvent::Sound(Sfx::EnemyDeath)), 2);
    assert_eq!(world.wave().live_count(), 0);
    assert!(world.boss().is_some());
    assert!(world.bullets().is_empty());
    assert!(world.explosions().is_empty());
}

#[test]
fn player_and_enemy_bullets_cancel_out() {
    let mut world = world_with(quiet_params());
    run_until(&mut world, Phase::Phase1);
    shoot_at(&mut world, EntityKind::PlayerBullet, Point::new(300.0, 400.0));
    shoot_at(&mut world, EntityKind::EnemyBullet, Point::new(302.0, 404.0));
    world.tick(DT);
    assert!(world.bullets().is_empty());
    assert_eq!(world.player().lives(), 5);
}

#[test]
fn boss_skip_only_works_from_phase1() {
    let mut world = world_with(quiet_params());
    world.skip_to_boss();
    assert_eq!(world.phase(), Phase::Intro);

    run_until(&mut world, Phase::Phase1);
    world.skip_to_boss();
    assert_eq!(world.phase(), Phase::BossIntro);
    assert_eq!(world.wave().live_count(), 0);
}

#[test]
fn boss_falls_after_exactly_max_hits() {
    let mut world = world_with(quiet_params());
    run_until(&mut world, Phase::Phase1);
    world.skip_to_boss();
    run_until(&mut world, Phase::Boss);
    assert!(!world.boss_bar().is_hidden());
    assert_eq!(world.boss_bar().label(), Some("30 / 30"));
    world.drain_events();

    let mut hits = 0;
    let mut last_hp = world.boss().map(|boss| boss.hp()).unwrap();
    let mut events = Vec::new();
    while world.phase() == Phase::Boss {
        let center = world.boss().map(|boss| boss.position).unwrap();
        shoot_at(&mut world, EntityKind::PlayerBullet, center);
        world.tick(DT);
        events.extend(world.drain_events());
        hits += 1;
        if let Some(boss) = world.boss() {
            assert_eq!(boss.hp(), last_hp - 1);
            last_hp = boss.hp();
        }
        assert!(hits <= 30, "boss survived {} hits", hits);
    }

    assert_eq!(hits, 30);
    assert_eq!(world.phase(), Phase::Win);
    assert_eq!(count(&events, FrameEvent::PhaseChanged(Phase::Win)), 1);
    assert_eq!(count(&events, FrameEvent::StopMusic), 1);
    assert!(world.boss().is_none());
    assert!(world.boss_bar().is_hidden());
    assert_eq!(world.explosions().len(), 1);

    // a click still held from the last shot can't skip the win screen
    assert_eq!(world.banner(), None);
    assert!(!world.accepts_restart());
    for _ in 0..20 {
        world.tick(DT);
    }
    assert_eq!(world.banner(), Some(Banner::Victory));
    assert!(world.accepts_restart());
}

#[test]
fn bullets_before_the_boss_settles_do_no_damage() {
    let mut world = world_with(quiet_params());
    run_until(&mut world, Phase::Phase1);
    world.skip_to_boss();
    for _ in 0..60 {
        world.tick(DT);
    }
    assert_eq!(world.phase(), Phase::BossIntro);
    let center = world.boss().map(|boss| boss.position).unwrap();
    assert!(center.y > 0.0);
    shoot_at(&mut world, EntityKind::PlayerBullet, center);
    world.tick(DT);
    assert_eq!(world.boss().map(|boss| boss.hp()), Some(30));
}
