//! End-to-end preset application against the simulated desktop

use std::sync::Arc;
use window_templates::macos::{NewWindowBehavior, SimulatedApp, SimulatedDesktop};
use window_templates::models::{NormalizedRect, PixelRect, Preset, ReferenceArea, Target};
use window_templates::services::{
    GroupOutcome, LayoutOrchestrator, LayoutOrchestratorConfig, SkipReason,
};
use window_templates::WindowTemplatesError;

const SAFARI: &str = "com.apple.Safari";
const TERMINAL: &str = "com.apple.Terminal";
const NOTES: &str = "com.apple.Notes";

fn area() -> ReferenceArea {
    ReferenceArea::new(0.0, 0.0, 1000.0, 800.0)
}

fn orchestrator(desktop: &Arc<SimulatedDesktop>) -> LayoutOrchestrator {
    LayoutOrchestrator::from_desktop(desktop.clone(), LayoutOrchestratorConfig::default())
}

fn thirds(bundle_id: &str) -> Vec<Target> {
    (0..3)
        .map(|col| Target::new(bundle_id, NormalizedRect::grid_cell(3, 1, col, 0)))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_insufficient_windows_places_what_exists() {
    let desktop = Arc::new(
        SimulatedDesktop::new(area()).with_app(
            SimulatedApp::new(TERMINAL)
                .running()
                .with_windows(1)
                .new_window(NewWindowBehavior::Ignores),
        ),
    );

    let report = orchestrator(&desktop)
        .apply(&Preset::new("Three terminals", thirds(TERMINAL)))
        .await
        .unwrap();

    assert_eq!(desktop.position_calls(), 1);
    assert_eq!(desktop.size_calls(), 1);
    assert!(desktop.new_window_requests(TERMINAL) <= 3);

    let group = report.group(TERMINAL).unwrap();
    assert_eq!(group.placed, 1);
    assert_eq!(group.skipped_targets, 2);
    assert_eq!(group.outcome, GroupOutcome::Partial);
    assert!(!report.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_permission_denied_touches_nothing() {
    let desktop = Arc::new(
        SimulatedDesktop::new(area())
            .untrusted()
            .with_app(SimulatedApp::new(SAFARI).with_windows(1))
            .with_app(SimulatedApp::new(TERMINAL).running().with_windows(1)),
    );

    let preset = Preset::new(
        "Work",
        vec![
            Target::new(SAFARI, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
            Target::new(TERMINAL, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)),
        ],
    );
    let error = orchestrator(&desktop).apply(&preset).await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<WindowTemplatesError>(),
        Some(WindowTemplatesError::PermissionDenied(_))
    ));
    assert_eq!(desktop.access_requests(), 1);
    assert!(desktop.launches().is_empty());
    assert!(!desktop.is_running(SAFARI));
    assert_eq!(desktop.position_calls(), 0);
    assert_eq!(desktop.size_calls(), 0);
    assert_eq!(desktop.new_window_requests(TERMINAL), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failing_application_does_not_block_others() {
    let desktop = Arc::new(
        SimulatedDesktop::new(area())
            .with_app(SimulatedApp::missing("com.example.uninstalled"))
            .with_app(SimulatedApp::new(SAFARI).with_windows(1))
            .with_app(
                SimulatedApp::new(NOTES)
                    .running()
                    .with_panel()
                    .new_window(NewWindowBehavior::Unsupported),
            )
            .with_app(SimulatedApp::new(TERMINAL).running()),
    );

    let preset = Preset::new(
        "Mixed",
        vec![
            Target::new("com.example.uninstalled", NormalizedRect::FULL),
            Target::new(SAFARI, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
            Target::new(NOTES, NormalizedRect::new(0.5, 0.0, 0.5, 0.5)),
            Target::new(TERMINAL, NormalizedRect::new(0.5, 0.5, 0.5, 0.5)),
        ],
    );
    let report = orchestrator(&desktop).apply(&preset).await.unwrap();

    let order: Vec<_> = report.groups.iter().map(|g| g.bundle_id.as_str()).collect();
    assert_eq!(order, vec!["com.example.uninstalled", SAFARI, NOTES, TERMINAL]);

    assert!(matches!(
        report.group("com.example.uninstalled").unwrap().outcome,
        GroupOutcome::Skipped(SkipReason::LaunchFailed(_))
    ));
    assert_eq!(
        report.group(NOTES).unwrap().outcome,
        GroupOutcome::Skipped(SkipReason::NoWindows)
    );
    assert_eq!(report.group(SAFARI).unwrap().outcome, GroupOutcome::Placed);
    assert_eq!(report.group(TERMINAL).unwrap().outcome, GroupOutcome::Placed);

    assert_eq!(
        desktop.window_frames(SAFARI),
        vec![PixelRect::new(0.0, 0.0, 500.0, 800.0)]
    );
    assert_eq!(
        desktop.window_frames(TERMINAL),
        vec![PixelRect::new(500.0, 400.0, 500.0, 400.0)]
    );
    assert_eq!(report.placed(), 2);
    assert_eq!(report.targets(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_windows_are_matched_to_targets_in_order() {
    let desktop = Arc::new(
        SimulatedDesktop::new(area()).with_app(SimulatedApp::new(TERMINAL).running().with_windows(3)),
    );

    let targets = thirds(TERMINAL);
    let expected: Vec<PixelRect> = targets.iter().map(|t| t.rect.to_pixel_rect(&area())).collect();

    orchestrator(&desktop)
        .apply(&Preset::new("Columns", targets))
        .await
        .unwrap();

    assert_eq!(desktop.window_frames(TERMINAL), expected);
    assert_eq!(desktop.new_window_requests(TERMINAL), 0);
}

#[tokio::test(start_paused = true)]
async fn test_extra_windows_are_left_alone() {
    let desktop = Arc::new(
        SimulatedDesktop::new(area()).with_app(SimulatedApp::new(SAFARI).running().with_windows(2)),
    );

    orchestrator(&desktop)
        .apply(&Preset::new(
            "One",
            vec![Target::new(SAFARI, NormalizedRect::FULL)],
        ))
        .await
        .unwrap();

    assert_eq!(
        desktop.window_frames(SAFARI),
        vec![
            PixelRect::new(0.0, 0.0, 1000.0, 800.0),
            PixelRect::new(0.0, 0.0, 800.0, 600.0),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reapplying_is_stable() {
    let desktop = Arc::new(SimulatedDesktop::new(area()).with_app(SimulatedApp::new(SAFARI)));
    let preset = Preset::new(
        "Halves",
        vec![
            Target::new(SAFARI, NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
            Target::new(SAFARI, NormalizedRect::new(0.5, 0.0, 0.5, 1.0)),
        ],
    );
    let orchestrator = orchestrator(&desktop);

    let first = orchestrator.apply(&preset).await.unwrap();
    let frames = desktop.window_frames(SAFARI);
    let second = orchestrator.apply(&preset).await.unwrap();

    assert_eq!(first.group(SAFARI).unwrap().windows_opened, 2);
    assert_eq!(second.group(SAFARI).unwrap().windows_opened, 0);
    assert_eq!(desktop.window_frames(SAFARI), frames);
    assert_eq!(desktop.launches(), vec![SAFARI.to_string()]);
}
