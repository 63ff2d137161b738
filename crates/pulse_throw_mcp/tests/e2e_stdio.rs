use rmcp::ServiceExt;
use rmcp::transport::TokioChildProcess;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

async fn mount_pulse_api(mock: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "token_type": "Bearer",
            "expires_in": 3600,
            "user_id": "owner1"
        })))
        .mount(mock)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/get_profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"id": "owner1", "firstName": "Pat", "lastName": "Pitcher"}
        })))
        .mount(mock)
        .await;

    let day = |date: &str, daily: f64| {
        serde_json::json!({
            "date": date,
            "throwCount": 10,
            "highEffortThrowCount": 1,
            "dailyWorkload": daily,
            "normDailyWorkload": daily / 10.0,
            "baseballProjectedOneDayWorkloads": []
        })
    };
    Mock::given(method("POST"))
        .and(path("/user/get_snapshots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "owner1": [
                    day("2022-08-20", 10.0),
                    day("2022-08-21", 20.0),
                    day("2022-08-22", 30.0)
                ]
            }
        })))
        .mount(mock)
        .await;
}

fn server_binary() -> PathBuf {
    // Prefer the prebuilt test binary; fall back to the workspace target dir.
    std::env::var("CARGO_BIN_EXE_pulse_throw_mcp")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let manifest_dir = PathBuf::from(
                std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"),
            );
            let workspace_root = manifest_dir
                .parent()
                .and_then(|p| p.parent())
                .unwrap_or(&manifest_dir)
                .to_path_buf();
            let target_root = std::env::var("CARGO_TARGET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| workspace_root.join("target"));

            let mut path = target_root.join("debug");
            path.push(if cfg!(windows) {
                "pulse_throw_mcp.exe"
            } else {
                "pulse_throw_mcp"
            });
            path
        })
}

#[tokio::test]
async fn e2e_stdio_lists_tools_and_computes_workload() {
    let mock = MockServer::start().await;
    mount_pulse_api(&mock).await;

    let mut cmd = Command::new(server_binary());
    cmd.env("PULSE_BASE_URL", mock.uri());
    cmd.env("PULSE_CLIENT_ID", "cid");
    cmd.env("PULSE_CLIENT_SECRET", "csecret");
    cmd.env("PULSE_REFRESH_TOKEN", "rtok");
    cmd.env("RUST_LOG", "debug");

    // spawn with piped stderr so we can capture server logs on failure
    let (child, mut stderr_opt) = TokioChildProcess::builder(cmd)
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn child");
    let service = match ().serve(child).await {
        Ok(s) => s,
        Err(e) => {
            if let Some(ref mut stderr) = stderr_opt {
                use tokio::io::AsyncReadExt;
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                eprintln!("child stderr:\n{}", buf);
            }
            panic!("serve failed: {e}");
        }
    };

    let tools = service
        .list_tools(Default::default())
        .await
        .expect("list tools");
    let names: Vec<_> = tools
        .tools
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();
    assert!(names.iter().any(|n| n == "get_profile"));
    assert!(names.iter().any(|n| n == "get_workload_metrics"));

    let res = service
        .call_tool(rmcp::model::CallToolRequestParams::new("get_profile"))
        .await
        .expect("call get_profile");
    let profile = res.structured_content.expect("structured profile");
    assert_eq!(profile["id"], "owner1");
    assert_eq!(profile["name"], "Pat Pitcher");

    let args = serde_json::json!({"end_date": "2022-08-22", "normalized": false});
    let mut params = rmcp::model::CallToolRequestParams::new("get_workload_metrics");
    params.arguments = args.as_object().cloned();
    let res = service
        .call_tool(params)
        .await
        .expect("call get_workload_metrics");
    let v = res.structured_content.expect("structured metrics");
    let owner = &v["users"]["owner1"];
    assert_eq!(owner["date"], "2022-08-22");
    let acute = owner["acute"].as_f64().expect("acute");
    let ratio = owner["ratio"].as_f64().expect("ratio");
    assert!((acute - 15.0).abs() < 1e-9);
    assert!((ratio - 1.75).abs() < 1e-9);

    service.cancel().await.expect("cancel");
}
