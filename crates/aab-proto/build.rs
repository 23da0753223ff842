// ABOUTME: Build script generating the SuperBuilder gRPC client stub.
// ABOUTME: Uses the tonic-build manual service builder over hand-written prost messages.

use tonic_build::manual::{Builder, Method, Service};

const PACKAGE: &str = "superbuilder_middleware";
const CODEC: &str = "tonic::codec::ProstCodec";

/// (rust method name, rpc route, request type, response type, server streaming)
const METHODS: &[(&str, &str, &str, &str, bool)] = &[
    ("say_hello_pyllm", "SayHelloPyllm", "SayHelloRequest", "SayHelloResponse", false),
    ("load_models", "LoadModels", "LoadModelsRequest", "LoadModelsResponse", false),
    ("get_chat_history", "GetChatHistory", "GetChatHistoryRequest", "GetChatHistoryResponse", false),
    ("chat", "Chat", "ChatRequest", "ChatResponse", true),
    ("remove_session", "RemoveSession", "RemoveSessionRequest", "RemoveSessionResponse", false),
    ("add_files", "AddFiles", "AddFilesRequest", "AddFilesResponse", true),
    ("remove_files", "RemoveFiles", "RemoveFilesRequest", "RemoveFilesResponse", false),
    ("get_file_list", "GetFileList", "GetFileListRequest", "GetFileListResponse", false),
    ("download_files", "DownloadFiles", "DownloadFilesRequest", "DownloadFilesResponse", true),
    ("set_parameters", "SetParameters", "SetParametersRequest", "SetParametersResponse", false),
    ("get_client_config", "GetClientConfig", "GetClientConfigRequest", "GetClientConfigResponse", false),
    ("set_active_assistant", "SetActiveAssistant", "SetActiveAssistantRequest", "SetActiveAssistantResponse", false),
    ("set_models", "SetModels", "SetModelsRequest", "SetModelsResponse", false),
    ("client_disconnected", "ClientDisconnected", "ClientDisconnectedRequest", "ClientDisconnectedResponse", false),
];

fn main() {
    let mut service = Service::builder().name("SuperBuilder").package(PACKAGE);

    for (name, route, input, output, streaming) in METHODS {
        let mut method = Method::builder()
            .name(*name)
            .route_name(*route)
            .input_type(format!("crate::{input}"))
            .output_type(format!("crate::{output}"))
            .codec_path(CODEC);
        if *streaming {
            method = method.server_streaming();
        }
        service = service.method(method.build());
    }

    Builder::new().compile(&[service.build()]);

    println!("cargo:rerun-if-changed=build.rs");
}
