// ABOUTME: Middleware trait describing the RPC surface the client consumes.
// ABOUTME: Implemented by the live gRPC connection and by in-memory fakes in tests.

use aab_grpc::{into_response_stream, Connection, ResponseStream};
use aab_proto::{
    AddFilesRequest, AddFilesResponse, ChatRequest, ChatResponse, ClientDisconnectedRequest,
    DownloadFilesRequest, DownloadFilesResponse, GetChatHistoryRequest, GetChatHistoryResponse,
    GetClientConfigRequest, GetClientConfigResponse, GetFileListRequest, GetFileListResponse,
    LoadModelsRequest, RemoveFilesRequest, RemoveFilesResponse, RemoveSessionRequest,
    SayHelloRequest, SayHelloResponse, SetActiveAssistantRequest, SetActiveAssistantResponse,
    SetModelsRequest, SetModelsResponse, SetParametersRequest, SetParametersResponse,
};
use async_trait::async_trait;
use tonic::Status;

/// The calls the AAB middleware exposes.
///
/// Unary calls return the decoded response; streaming calls return the raw,
/// unbuffered server stream.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Liveness handshake.
    async fn say_hello(&self, request: SayHelloRequest) -> Result<SayHelloResponse, Status>;

    /// Ask the backend to preload generation models.
    async fn load_models(&self) -> Result<(), Status>;

    async fn get_chat_history(&self) -> Result<GetChatHistoryResponse, Status>;

    async fn chat(&self, request: ChatRequest) -> Result<ResponseStream<ChatResponse>, Status>;

    async fn remove_session(&self, request: RemoveSessionRequest) -> Result<(), Status>;

    async fn add_files(
        &self,
        request: AddFilesRequest,
    ) -> Result<ResponseStream<AddFilesResponse>, Status>;

    async fn remove_files(&self, request: RemoveFilesRequest)
        -> Result<RemoveFilesResponse, Status>;

    async fn get_file_list(&self, request: GetFileListRequest)
        -> Result<GetFileListResponse, Status>;

    async fn download_files(
        &self,
        request: DownloadFilesRequest,
    ) -> Result<ResponseStream<DownloadFilesResponse>, Status>;

    async fn set_parameters(
        &self,
        request: SetParametersRequest,
    ) -> Result<SetParametersResponse, Status>;

    async fn get_client_config(&self) -> Result<GetClientConfigResponse, Status>;

    async fn set_active_assistant(
        &self,
        request: SetActiveAssistantRequest,
    ) -> Result<SetActiveAssistantResponse, Status>;

    async fn set_models(&self, request: SetModelsRequest) -> Result<SetModelsResponse, Status>;

    /// Tell the backend this client is going away.
    async fn client_disconnected(&self) -> Result<(), Status>;
}

#[async_trait]
impl Middleware for Connection {
    async fn say_hello(&self, request: SayHelloRequest) -> Result<SayHelloResponse, Status> {
        Ok(self.client().say_hello_pyllm(request).await?.into_inner())
    }

    async fn load_models(&self) -> Result<(), Status> {
        self.client().load_models(LoadModelsRequest {}).await?;
        Ok(())
    }

    async fn get_chat_history(&self) -> Result<GetChatHistoryResponse, Status> {
        Ok(self
            .client()
            .get_chat_history(GetChatHistoryRequest {})
            .await?
            .into_inner())
    }

    async fn chat(&self, request: ChatRequest) -> Result<ResponseStream<ChatResponse>, Status> {
        let streaming = self.client().chat(request).await?.into_inner();
        Ok(into_response_stream(streaming))
    }

    async fn remove_session(&self, request: RemoveSessionRequest) -> Result<(), Status> {
        self.client().remove_session(request).await?;
        Ok(())
    }

    async fn add_files(
        &self,
        request: AddFilesRequest,
    ) -> Result<ResponseStream<AddFilesResponse>, Status> {
        let streaming = self.client().add_files(request).await?.into_inner();
        Ok(into_response_stream(streaming))
    }

    async fn remove_files(
        &self,
        request: RemoveFilesRequest,
    ) -> Result<RemoveFilesResponse, Status> {
        Ok(self.client().remove_files(request).await?.into_inner())
    }

    async fn get_file_list(
        &self,
        request: GetFileListRequest,
    ) -> Result<GetFileListResponse, Status> {
        Ok(self.client().get_file_list(request).await?.into_inner())
    }

    async fn download_files(
        &self,
        request: DownloadFilesRequest,
    ) -> Result<ResponseStream<DownloadFilesResponse>, Status> {
        let streaming = self.client().download_files(request).await?.into_inner();
        Ok(into_response_stream(streaming))
    }

    async fn set_parameters(
        &self,
        request: SetParametersRequest,
    ) -> Result<SetParametersResponse, Status> {
        Ok(self.client().set_parameters(request).await?.into_inner())
    }

    async fn get_client_config(&self) -> Result<GetClientConfigResponse, Status> {
        Ok(self
            .client()
            .get_client_config(GetClientConfigRequest {})
            .await?
            .into_inner())
    }

    async fn set_active_assistant(
        &self,
        request: SetActiveAssistantRequest,
    ) -> Result<SetActiveAssistantResponse, Status> {
        Ok(self.client().set_active_assistant(request).await?.into_inner())
    }

    async fn set_models(&self, request: SetModelsRequest) -> Result<SetModelsResponse, Status> {
        Ok(self.client().set_models(request).await?.into_inner())
    }

    async fn client_disconnected(&self) -> Result<(), Status> {
        self.client()
            .client_disconnected(ClientDisconnectedRequest {})
            .await?;
        Ok(())
    }
}
