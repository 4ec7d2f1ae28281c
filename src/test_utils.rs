//! Fixtures shared by the unit tests

use std::path::Path;

pub const ACCESS_LOGGER_ABI: &str = r#"[
    {
        "anonymous": false,
        "inputs": [
            {"indexed": false, "internalType": "uint256", "name": "recordId", "type": "uint256"},
            {"indexed": false, "internalType": "uint256", "name": "patientId", "type": "uint256"},
            {"indexed": false, "internalType": "string", "name": "accessor", "type": "string"},
            {"indexed": false, "internalType": "uint256", "name": "timestamp", "type": "uint256"}
        ],
        "name": "AccessLogged",
        "type": "event"
    },
    {
        "inputs": [
            {"internalType": "uint256", "name": "recordId", "type": "uint256"},
            {"internalType": "uint256", "name": "patientId", "type": "uint256"},
            {"internalType": "string", "name": "accessor", "type": "string"}
        ],
        "name": "logAccess",
        "outputs": [],
        "stateMutability": "nonpayable",
        "type": "function"
    }
]"#;

/// Write `<root>/contracts/<name>.sol/<name>.json` the way the toolchain does
pub fn write_artifact(root: &Path, name: &str, bytecode: &str) {
    let dir = root.join(format!("contracts/{name}.sol"));
    std::fs::create_dir_all(&dir).unwrap();

    let abi: serde_json::Value = serde_json::from_str(ACCESS_LOGGER_ABI).unwrap();
    let artifact = serde_json::json!({
        "_format": "hh-sol-artifact-1",
        "contractName": name,
        "sourceName": format!("contracts/{name}.sol"),
        "abi": abi,
        "bytecode": bytecode,
        "deployedBytecode": bytecode,
        "linkReferences": {},
        "deployedLinkReferences": {}
    });
    std::fs::write(dir.join(format!("{name}.json")), serde_json::to_string_pretty(&artifact).unwrap()).unwrap();
}

/// Write a build info file and the debug file pointing at it
pub fn write_build_info(root: &Path, name: &str, solc_version: &str, optimizer: bool, runs: u32) {
    let build_info_dir = root.join("build-info");
    std::fs::create_dir_all(&build_info_dir).unwrap();

    let build_info = serde_json::json!({
        "_format": "hh-sol-build-info-1",
        "id": "3f1c2a",
        "solcVersion": solc_version,
        "solcLongVersion": solc_version,
        "input": {
            "language": "Solidity",
            "sources": {},
            "settings": { "optimizer": { "enabled": optimizer, "runs": runs } }
        },
        "output": {}
    });
    std::fs::write(build_info_dir.join("3f1c2a.json"), build_info.to_string()).unwrap();

    let dbg = serde_json::json!({
        "_format": "hh-sol-dbg-1",
        "buildInfo": "../../build-info/3f1c2a.json"
    });
    std::fs::write(
        root.join(format!("contracts/{name}.sol/{name}.dbg.json")),
        dbg.to_string(),
    )
    .unwrap();
}
