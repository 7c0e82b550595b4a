//! End-to-end tests through the `Game` driver.

use bevy_ecs::prelude::Entity;

use gearroulette::components::mapposition::MapPosition;
use gearroulette::components::roulette::{
    Outcome, RunMode, RunState, SummonRequest, Transition,
};
use gearroulette::events::roulette::RouletteMessage;
use gearroulette::game::Game;
use gearroulette::presentation::{PresentationSink, SegmentView};
use gearroulette::resources::rouletteconfig::RouletteConfig;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

const CHAIN: &str = "
[session]
root = boss

[roulette.boss]
max_value = 10
speed = 10
effects = call

[roulette.child]
max_value = 10
speed = 1
mode = timed_loop
pre_run_delay = 0.5
catch_up_duration = 1.0
effects = bite

[effect.call]
type = summon
weight = 10
summon_speed = 20
summon_template = child

[effect.bite]
type = attack
weight = 10
magnitude = -2
";

fn chain_game() -> Game {
    Game::new(&RouletteConfig::from_ini_str(CHAIN).unwrap()).unwrap()
}

fn transitions(messages: &[RouletteMessage]) -> Vec<&Transition> {
    messages.iter().map(|message| &message.transition).collect()
}

#[derive(Default)]
struct RecordingSink {
    texts: Vec<(Entity, String)>,
    angles: Vec<(Entity, f32)>,
    segments: Vec<(Entity, usize)>,
    visibility: Vec<(Entity, Vec<bool>)>,
    summons: Vec<(Entity, SummonRequest)>,
    removed: Vec<Entity>,
}

impl PresentationSink for RecordingSink {
    fn display_text(&mut self, entity: Entity, text: &str) {
        self.texts.push((entity, text.to_string()));
    }

    fn pointer_angle(&mut self, entity: Entity, degrees: f32) {
        self.angles.push((entity, degrees));
    }

    fn segments(&mut self, entity: Entity, segments: &[SegmentView]) {
        self.segments.push((entity, segments.len()));
    }

    fn segment_visibility(&mut self, entity: Entity, visible: &[bool]) {
        self.visibility.push((entity, visible.to_vec()));
    }

    fn summon_requested(&mut self, origin: Entity, request: &SummonRequest) {
        self.summons.push((origin, request.clone()));
    }

    fn removed(&mut self, entity: Entity) {
        self.removed.push(entity);
    }
}

#[test]
fn builtin_session_starts_with_idle_root() {
    let mut game = Game::new(&RouletteConfig::builtin()).unwrap();
    let root = game.root();
    assert_eq!(game.roulettes(), vec![root]);

    let view = game.view(root).unwrap();
    assert_eq!(view.run_state, RunState::Idle);
    assert_eq!(view.display_text, "Press Space to Start");
    assert_eq!(view.segments.len(), 3);
    assert!(!view.summoned);
    assert_eq!(view.id, root.to_bits());
}

#[test]
fn manual_cycle_through_the_driver() {
    let mut game = Game::new(&RouletteConfig::builtin()).unwrap();
    let root = game.root();

    game.advance_input(Some(root));
    assert_eq!(game.view(root).unwrap().display_text, "Start!");
    let messages = game.tick(0.5);
    assert_eq!(transitions(&messages), vec![&Transition::Started]);

    let view = game.view(root).unwrap();
    assert!(approx_eq(view.current_value, 2.0));
    assert_eq!(view.display_text, "2");
    assert!(approx_eq(view.pointer_angle, -72.0));

    game.advance_input(None);
    let messages = game.tick(0.1);
    let seen = transitions(&messages);
    let [Transition::Stopped(resolution)] = seen.as_slice() else {
        panic!("expected a stop, got {messages:?}");
    };
    assert_eq!(resolution.outcome, Outcome::Attack(3.0));
    assert_eq!(game.view(root).unwrap().display_text, "Stopped at 2 → ATK 3");

    game.advance_input(None);
    game.tick(0.1);
    let view = game.view(root).unwrap();
    assert_eq!(view.run_state, RunState::Idle);
    assert_eq!(view.current_value, 0.0);
    assert_eq!(game.session().tally.attack_total, 3.0);
}

#[test]
fn summon_chain_spawns_and_retires_child() {
    let mut game = chain_game();
    let boss = game.root();

    game.advance_input(None);
    game.tick(0.5);
    game.advance_input(None);
    game.tick(0.0);
    assert!(game.roulette(boss).unwrap().pending_summon());
    assert_eq!(
        game.view(boss).unwrap().display_text,
        "Stopped at 5 → Call new pointer!"
    );

    game.advance_input(Some(boss));
    let messages = game.tick(0.0);
    assert!(matches!(
        transitions(&messages).as_slice(),
        [Transition::Reset { summon: Some(_) }]
    ));
    assert!(!game.roulette(boss).unwrap().pending_summon());

    let roulettes = game.roulettes();
    assert_eq!(roulettes.len(), 2);
    let child = roulettes[1];
    let child_view = game.view(child).unwrap();
    assert!(child_view.summoned);
    assert_eq!(child_view.position, MapPosition::new(0.0, -200.0));
    assert_eq!(child_view.display_text, "Get Ready...");
    assert_eq!(game.roulette(child).unwrap().speed, 20.0);

    // 0.5 s delay, 0.5 s to overflow at speed 20, 1 s catch-up, then reset.
    let mut missed = false;
    for _ in 0..25 {
        let messages = game.tick(0.1);
        missed |= messages
            .iter()
            .any(|m| m.entity == child && m.transition == Transition::Missed);
    }
    assert!(missed);
    assert_eq!(game.roulettes(), vec![boss]);
    assert_eq!(game.session().tally.summons_requested, 1);
}

#[test]
fn child_survives_when_session_keeps_summons() {
    let text = CHAIN.replace("root = boss", "root = boss\ndespawn_summoned_when_done = false");
    let mut game = Game::new(&RouletteConfig::from_ini_str(&text).unwrap()).unwrap();
    let boss = game.root();

    game.advance_input(Some(boss));
    game.tick(0.5);
    game.advance_input(Some(boss));
    game.advance_input(Some(boss));
    game.tick(0.0);
    for _ in 0..40 {
        game.tick(0.1);
    }
    assert_eq!(game.roulettes().len(), 2);
}

#[test]
fn summon_with_unknown_template_only_resets() {
    let text = CHAIN.replace("summon_template = child", "summon_template = ghost");
    let mut game = Game::new(&RouletteConfig::from_ini_str(&text).unwrap()).unwrap();
    let boss = game.root();

    game.advance_input(None);
    game.tick(0.5);
    game.advance_input(None);
    game.advance_input(None);
    game.tick(0.0);

    assert_eq!(game.roulettes(), vec![boss]);
    assert_eq!(game.view(boss).unwrap().run_state, RunState::Idle);
}

#[test]
fn summoned_child_retires_when_its_own_summon_has_no_template() {
    let text = CHAIN
        .replace("mode = timed_loop\n", "")
        .replace("effects = bite", "effects = echo")
        + "
[effect.echo]
type = summon
weight = 10
summon_speed = 5
summon_template = ghost
";
    let mut game = Game::new(&RouletteConfig::from_ini_str(&text).unwrap()).unwrap();
    let boss = game.root();

    game.advance_input(Some(boss));
    game.tick(0.5);
    game.advance_input(Some(boss));
    game.advance_input(Some(boss));
    game.tick(0.0);
    let child = game.roulettes()[1];
    assert_eq!(game.roulette(child).unwrap().mode, RunMode::Manual);

    game.advance_input(Some(child));
    game.tick(0.2);
    game.advance_input(Some(child));
    game.advance_input(Some(child));
    let messages = game.tick(0.0);
    assert!(matches!(
        transitions(&messages).as_slice(),
        [Transition::Stopped(_), Transition::Reset { summon: Some(_) }]
    ));
    assert_eq!(game.roulettes(), vec![boss]);
}

#[test]
fn pending_summon_is_cancelled_by_teardown() {
    let mut game = chain_game();

    game.advance_input(None);
    game.tick(0.5);
    game.advance_input(None);
    game.advance_input(None);
    game.teardown(None);
    let messages = game.tick(0.1);

    assert!(matches!(
        transitions(&messages).as_slice(),
        [Transition::Stopped(_), Transition::Reset { summon: Some(_) }]
    ));
    assert!(game.roulettes().is_empty());
    assert!(game.tick(0.1).is_empty());
}

#[test]
fn present_pushes_views_and_summons() {
    let mut game = chain_game();
    let boss = game.root();
    let mut sink = RecordingSink::default();

    game.advance_input(None);
    game.tick(0.5);
    game.advance_input(None);
    game.advance_input(None);
    let messages = game.tick(0.0);
    game.present(&messages, &mut sink);

    assert_eq!(sink.summons.len(), 1);
    assert_eq!(sink.summons[0].0, boss);
    assert_eq!(sink.summons[0].1.speed, 20.0);
    assert_eq!(sink.texts.len(), 2);
    assert_eq!(sink.texts[0], (boss, "Press Space to Start".to_string()));
    assert_eq!(sink.segments, vec![(boss, 1), (game.roulettes()[1], 1)]);
    assert_eq!(sink.angles.len(), 2);
    assert_eq!(sink.visibility[0], (boss, vec![true]));
    assert!(sink.removed.is_empty());

    let child = game.roulettes()[1];
    game.teardown(Some(child));
    game.present(&[], &mut sink);
    assert_eq!(sink.removed, vec![child]);
}

#[test]
fn visible_range_reaches_the_view() {
    let mut game = Game::new(&RouletteConfig::builtin()).unwrap();
    let root = game.root();

    game.set_visible_range(root, Some((300.0, 20.0)));
    assert_eq!(
        game.view(root).unwrap().segment_visibility(),
        vec![true, false, true]
    );

    game.set_visible_range(root, None);
    assert_eq!(
        game.view(root).unwrap().segment_visibility(),
        vec![true, true, true]
    );
}

#[test]
fn teardown_all_then_tick_is_quiet() {
    let mut game = Game::new(&RouletteConfig::builtin()).unwrap();
    game.advance_input(None);
    game.teardown(None);
    assert!(game.roulettes().is_empty());
    assert!(game.view(game.root()).is_none());

    let messages = game.tick(0.1);
    // The press before teardown is still reported.
    assert_eq!(transitions(&messages), vec![&Transition::Started]);
    assert!(game.tick(0.1).is_empty());
}

#[test]
fn spawn_adds_idle_roulette_from_template() {
    let mut game = Game::new(&RouletteConfig::builtin()).unwrap();
    let minion = game.spawn("Minion", MapPosition::new(5.0, 5.0)).unwrap();
    assert!(game.spawn("ghost", MapPosition::default()).is_none());

    let view = game.view(minion).unwrap();
    assert_eq!(view.run_state, RunState::Idle);
    assert_eq!(view.display_text, "Get Ready...");
    assert!(!view.summoned);
}

#[test]
fn views_serialize_to_json() {
    let mut game = Game::new(&RouletteConfig::builtin()).unwrap();
    let json = serde_json::to_value(game.views()).unwrap();
    let first = &json[0];
    assert_eq!(first["display_text"], "Press Space to Start");
    assert_eq!(first["run_state"], "Idle");
    assert_eq!(first["segments"].as_array().unwrap().len(), 3);
    assert_eq!(first["segments"][0]["color_key"], "red");
    assert!(first.get("entity").is_none());
}
