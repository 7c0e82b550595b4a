use bevy_ecs::prelude::*;

use crate::events::roulette::RouletteMessage;
use crate::resources::session::Session;

/// Tally this tick's roulette messages and queue them for the driver.
pub fn session_tally_system(
    mut reader: MessageReader<RouletteMessage>,
    mut session: ResMut<Session>,
) {
    for message in reader.read() {
        session.record(message.clone());
    }
}
