use clap::CommandFactory;

use super::*;

fn session() -> ClientSession<Raster> {
    ClientSession::new(Raster::new(120, 120, BOARD_BACKGROUND), "Tester")
}

fn draws(actions: &[Action]) -> Vec<&frames::StrokeSegment> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Draw(segment) => Some(segment),
            _ => None,
        })
        .collect()
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn defaults_point_at_local_server() {
    let cli = Cli::try_parse_from(["whiteboard-cli", "watch"]).unwrap();
    assert_eq!(cli.backoff_ms, 1000);
    assert!(matches!(cli.command, Command::Watch));
}

#[test]
fn draw_arguments_parse() {
    let cli = Cli::try_parse_from([
        "whiteboard-cli",
        "--url",
        "ws://example.test/ws",
        "--name",
        "Bot",
        "draw",
        "Rectangle",
        "10",
        "10",
        "50",
        "50",
        "--color",
        "#ff0000",
        "--width",
        "4",
        "--dashed",
    ])
    .unwrap();
    assert_eq!(cli.url, "ws://example.test/ws");
    assert_eq!(cli.name, "Bot");
    let Command::Draw(args) = cli.command else {
        panic!("expected draw");
    };
    assert_eq!(args.tool, Tool::Rectangle);
    assert_eq!((args.x0, args.y0, args.x1, args.y1), (10.0, 10.0, 50.0, 50.0));
    assert_eq!(args.color, "#ff0000");
    assert!(args.dashed);
    assert_eq!(tool_config(&args).dash, DashStyle::Dashed);
}

#[test]
fn unknown_tools_are_rejected() {
    assert_eq!(parse_tool(" Arrow "), Ok(Tool::Arrow));
    assert!(parse_tool("spraycan").is_err());
    assert!(Cli::try_parse_from(["whiteboard-cli", "draw", "text", "0", "0", "1", "1"]).is_err());
}

#[test]
fn shapes_commit_exactly_one_segment() {
    let mut s = session();
    s.engine.set_tool(ToolConfig { tool: Tool::Circle, ..ToolConfig::default() });
    let actions = draw_stroke(&mut s, Point::new(60.0, 60.0), Point::new(80.0, 60.0));
    let segments = draws(&actions);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].tool, Tool::Circle);
    assert!(s.engine.surface().painted_pixels() > 0);
}

#[test]
fn freehand_tools_emit_one_segment_per_move() {
    let mut s = session();
    let actions = draw_stroke(&mut s, Point::new(5.0, 5.0), Point::new(40.0, 5.0));
    let segments = draws(&actions);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].from, Point::new(5.0, 5.0));
    assert_eq!(segments[0].to, Point::new(40.0, 5.0));
}

#[test]
fn zero_size_shapes_draw_nothing() {
    let mut s = session();
    s.engine.set_tool(ToolConfig { tool: Tool::Rectangle, ..ToolConfig::default() });
    let actions = draw_stroke(&mut s, Point::new(5.0, 5.0), Point::new(5.0, 5.0));
    assert!(draws(&actions).is_empty());
    assert_eq!(s.engine.surface().painted_pixels(), 0);
}
