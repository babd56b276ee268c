//! Three simulated players walk through a full lobby: Alice hosts, Bob
//! and Carol join, Alice tunes the settings and starts the game, and
//! everyone confirms their role. Each client is a real `LobbyClient`; the
//! only simulated part is that they share an in-memory store instead of a
//! remote one.
//!
//! Run with `RUST_LOG=debug` to watch the commits and conflicts underneath.

use std::sync::Arc;

use nightfall::prelude::*;
use nightfall::RoleSummaryEntry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CommandError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());

    // -- Landing screen: Alice hosts, Bob and Carol type the code in. ----
    let mut alice = LobbyClient::new(Arc::clone(&store));
    let code = alice.create_room("Alice").await?;
    println!("Alice opened room {code}");

    let mut bob = LobbyClient::new(Arc::clone(&store));
    bob.join_room(code.as_str(), "Bob").await?;
    let mut carol = LobbyClient::new(Arc::clone(&store));
    // Carol typed the code in lowercase; it normalizes.
    carol
        .join_room(&code.as_str().to_lowercase(), "Carol")
        .await?;

    pump(&mut [&mut alice, &mut bob, &mut carol]);
    print_lobby(&alice);

    // -- Host tunes the settings. ----------------------------------------
    alice
        .adjust_settings(SettingsDelta::IncludeDetective(false))
        .await?;
    if let Err(e) = alice.adjust_settings(SettingsDelta::MafiaCount(4)).await {
        println!("rejected locally: {e}");
    }
    pump(&mut [&mut alice, &mut bob, &mut carol]);
    print_lobby(&alice);

    // -- Start: everyone gets their role pushed. -------------------------
    alice.start_game().await?;
    for (name, client) in
        [("Alice", &mut alice), ("Bob", &mut bob), ("Carol", &mut carol)]
    {
        for update in client.drain_updates() {
            if let LobbyUpdate::RoleRevealed(role) = update {
                let info = role.info();
                println!(
                    "{name} flips their card: {} {} ({})",
                    info.icon,
                    info.name,
                    role.team()
                );
            }
        }
    }

    // -- Everyone confirms. ----------------------------------------------
    bob.set_ready().await?;
    carol.set_ready().await?;
    alice.set_ready().await?;
    pump(&mut [&mut alice, &mut bob, &mut carol]);

    if alice.phase() == Phase::AllReady {
        println!("all {} players are ready", alice.view().player_count);
        if let Some(summary) = &alice.view().role_summary {
            println!("host summary:");
            for RoleSummaryEntry { name, role } in summary {
                println!("  {name:<8} {role}");
            }
        }
    }

    // -- Everyone heads home; the host's leave closes the room. ----------
    bob.leave_room().await?;
    carol.leave_room().await?;
    alice.leave_room().await?;
    println!("room {code} closed");
    Ok(())
}

/// Applies every pending remote event on each client.
fn pump(clients: &mut [&mut LobbyClient<MemoryStore>]) {
    for client in clients {
        client.drain_updates();
    }
}

fn print_lobby(host: &LobbyClient<MemoryStore>) {
    let view = host.view();
    println!("lobby ({} players):", view.player_count);
    for player in &view.players {
        let tag = if player.is_host { " (host)" } else { "" };
        println!("  {}{tag}", player.name);
    }
    if let Some(plan) = &view.role_plan {
        println!(
            "  plan: {} mafia, {} civilian{}{}",
            plan.mafia,
            plan.civilians,
            if plan.doctor { ", 1 doctor" } else { "" },
            if plan.detective { ", 1 detective" } else { "" },
        );
    }
}
